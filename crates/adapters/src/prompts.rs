//! Prompt templates sent to the model gateway.
//!
//! Kept in one place so the panorama seam constraints, catalog filtering
//! rules, and upscaler settings stay consistent across adapters.

/// System prompt for the room-description stage.
pub const ROOM_DESCRIPTION_SYSTEM: &str = "\
Create detailed room descriptions for 360\u{b0} panoramic visualization.

Include:
- Room type and function
- Architectural elements (walls, flooring, ceiling, windows, doors)
- Lighting setup (natural and artificial)
- Spatial layout and flow
- Basic furniture placement
- Color scheme and materials
- Design style and atmosphere

Be specific for accurate visualization, focus on 360\u{b0} view elements, \
use professional terminology.";

/// Build the equirectangular panorama prompt around a room description.
///
/// The edge-seam wording matters: the generation model only produces
/// wrap-around panoramas when the left/right merge constraint is spelled
/// out explicitly.
pub fn panorama_prompt(description: &str) -> String {
    format!(
        "360-degree equirectangular panorama for VR viewing.\n\
         ({{ prompt: {description} }}).\n\
         Photorealistic, 8k, ultra-high detail.\n\
         A full 360-degree view of the entire scene, as seen from all angles.\n\
         All boundaries of the image must be perfect and seamless.\n\
         The left and right edge must be the same and merge into each other."
    )
}

/// Instruction for the segment-classification stage.
///
/// Structural labels are excluded here rather than post-filtered: the
/// classifier sees the image and the full label list and returns only the
/// ids worth matching against the catalog.
pub const CATALOGABLE_INSTRUCTION: &str = "\
Select the detected items that are furniture pieces which could \
realistically be replaced with catalog products (sofa, table, chair, bed, \
desk, bookshelf, etc.). Exclude structural elements such as walls, floors, \
ceilings, windows, and doors. Respond with a JSON array of the selected \
item ids and nothing else.";

/// Prompt for the product-injection stage.
pub const INJECTION_PROMPT: &str = "\
Inject the catalog products into the fully furnished panorama image. \
Maintain the exact same room layout, camera position, perspective, and \
lighting. Keep all architectural elements unchanged. Ensure realistic \
scale, placement, and shadows so the result looks natural.";

/// Positive prompt for the upscaling stage.
pub const UPSCALE_PROMPT: &str = "masterpiece, best quality, highres";

/// Negative prompt for the upscaling stage.
pub const UPSCALE_NEGATIVE_PROMPT: &str = "(worst quality, low quality, normal quality:2)";
