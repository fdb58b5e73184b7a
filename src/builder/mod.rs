mod code;

pub use code::{render, CodeImage};

use crate::common::{
    encode_bits, BitString, CanvasLayout, CodeResult, DEFAULT_SIDE, KEY_BITS, MARK_THICKNESS,
};

/// Renders a key with the default 600x600 layout.
pub fn encode(key: u64) -> CodeImage {
    code::paint(&BitString::from_key(key), CanvasLayout::DEFAULT, MARK_THICKNESS)
}

pub struct CodeBuilder {
    key: u64,
    side: u32,
    thickness: u32,
}

impl CodeBuilder {
    pub fn new(key: u64) -> Self {
        Self { key, side: DEFAULT_SIDE, thickness: MARK_THICKNESS }
    }

    pub fn key(&mut self, key: u64) -> &mut Self {
        self.key = key;
        self
    }

    pub fn side(&mut self, side: u32) -> &mut Self {
        self.side = side;
        self
    }

    pub fn mark_thickness(&mut self, thickness: u32) -> &mut Self {
        self.thickness = thickness;
        self
    }

    pub fn metadata(&self) -> String {
        format!(
            "{{ Key: {}, Side: {}, Mark thickness: {} }}",
            self.key, self.side, self.thickness
        )
    }

    pub fn bits(&self) -> CodeResult<BitString> {
        encode_bits(self.key, KEY_BITS)
    }

    pub fn build(&self) -> CodeResult<CodeImage> {
        let bits = self.bits()?;
        log::debug!("Rendering code {}", self.metadata());
        render(&bits, self.side, self.thickness)
    }
}

#[cfg(test)]
mod builder_tests {
    use super::{encode, CodeBuilder};
    use crate::common::{encode_bits, CodeError, KEY_BITS};

    #[test]
    fn test_encode_uses_bit_codec() {
        for key in [0, 7, 0xDEAD_BEEF, u64::MAX] {
            assert_eq!(*encode(key).bits(), encode_bits(key, KEY_BITS).unwrap());
        }
    }

    #[test]
    fn test_metadata() {
        let mut builder = CodeBuilder::new(42);
        builder.side(300).mark_thickness(6);
        assert_eq!(builder.metadata(), "{ Key: 42, Side: 300, Mark thickness: 6 }");
    }

    #[test]
    fn test_encode_defaults() {
        let code = encode(12345);
        assert_eq!(code.side(), 600);
        assert_eq!(code.as_image().dimensions(), (600, 600));
        assert_eq!(code.key(), 12345);
        assert_eq!(code.bits().len(), 64);
    }

    #[test]
    fn test_build_is_deterministic() {
        let a = CodeBuilder::new(987654321).build().unwrap();
        let b = CodeBuilder::new(987654321).build().unwrap();
        assert_eq!(a, b);
        let c = CodeBuilder::new(987654320).build().unwrap();
        assert_ne!(a.as_image(), c.as_image());
    }

    #[test]
    fn test_build_rejects_small_side() {
        let res = CodeBuilder::new(1).side(5).build();
        assert!(matches!(res, Err(CodeError::InvalidSide(5))));
    }
}
