/// Types that can be written into a frame body.
pub trait Serialize<'a> {
    /// Writes the owned part of `self` into `buf`.
    ///
    /// # Arguments
    /// * `buf` - The buffer to extend with the serialized bytes.
    ///
    /// # Returns
    /// A trailing slice of bytes that should be written right after `buf` without
    /// being copied into it, if any.
    fn serialize(&'a self, buf: &mut Vec<u8>) -> Option<&'a [u8]>;
}
