/// Identifier for a scene (one generation conversation).
pub type SceneId = uuid::Uuid;
