#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VertexMode {
    #[default]
    SrcIgnore,
    SrcEmissive,
    SrcAmbDiff,
    Unknown(u32),
}
impl From<u32> for VertexMode {
    fn from(value: u32) -> Self {
        match value {
            0 => Self::SrcIgnore,
            1 => Self::SrcEmissive,
            2 => Self::SrcAmbDiff,
            _ => Self::Unknown(value),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LightMode {
    #[default]
    Emissive,
    EmissiveAmbientDiffuse,
    Unknown(u32),
}
impl From<u32> for LightMode {
    fn from(value: u32) -> Self {
        match value {
            0 => Self::Emissive,
            1 => Self::EmissiveAmbientDiffuse,
            _ => Self::Unknown(value),
        }
    }
}
