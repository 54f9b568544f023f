// Represents a single text keyframe
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TextKey {
    pub time: f32,
    pub text: String,
}
