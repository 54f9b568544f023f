use serde::{Deserialize, Serialize};

/// The only layout this crate understands: NetImmerse 4.0.0.2.
pub const NIF_VERSION_4_0_0_2: u32 = 0x0400_0002;
pub const NIF_HEADER_PREFIX: &str = "NetImmerse File Format";

/// Reader settings. Defaults match what Morrowind-era files need.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NifOptions {
    /// Version the block layouts are written for.
    pub version: u32,
    /// Refuse files whose header version differs from `version` instead of warning.
    pub strict_version: bool,
    /// Upper bound for any length-prefixed string.
    pub max_string_len: u32,
    /// Upper bound for any count-prefixed array (vertices, keys, links, ...).
    pub max_array_len: u32,
    /// After links are fixed, bind bones to skin data and straighten skeletons.
    pub resolve_skins: bool,
}

impl Default for NifOptions {
    fn default() -> Self {
        Self {
            version: NIF_VERSION_4_0_0_2,
            strict_version: false,
            max_string_len: 819_200,
            max_array_len: 1_000_000,
            resolve_skins: true,
        }
    }
}

impl NifOptions {
    pub fn header_line(&self) -> String {
        let v = self.version;
        format!(
            "{}, Version {}.{}.{}.{}",
            NIF_HEADER_PREFIX,
            v >> 24,
            (v >> 16) & 0xFF,
            (v >> 8) & 0xFF,
            v & 0xFF
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_line_formats_dotted_version() {
        let opts = NifOptions::default();
        assert_eq!(
            opts.header_line(),
            "NetImmerse File Format, Version 4.0.0.2"
        );
    }
}
