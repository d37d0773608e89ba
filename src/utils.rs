use core::fmt;

/// Space-separated hex rendering of a transfer buffer, e.g. `9f 00 c2`.
pub struct Bytes<'a>(pub &'a [u8]);

impl fmt::Display for Bytes<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut bytes = self.0.iter();
        if let Some(first) = bytes.next() {
            write!(f, "{:02x}", first)?;
        }
        bytes.try_for_each(|byte| write!(f, " {:02x}", byte))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_buffers() {
        assert_eq!(Bytes(&[0x9f, 0x00, 0xc2]).to_string(), "9f 00 c2");
        assert_eq!(Bytes(&[]).to_string(), "");
    }
}
