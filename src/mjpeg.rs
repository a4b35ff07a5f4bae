//! Reading back motion-JPEG containers.
//!
//! A container is JPEG images written back to back with nothing in between,
//! so frames are recovered by scanning for start-of-image and end-of-image
//! markers.

/// Start-of-image marker.
pub const SOI: [u8; 2] = [0xFF, 0xD8];
/// End-of-image marker.
pub const EOI: [u8; 2] = [0xFF, 0xD9];

/// Whether `data` starts with SOI and ends with EOI.
pub fn is_complete_jpeg(data: &[u8]) -> bool {
    data.len() >= 4 && data.starts_with(&SOI) && data.ends_with(&EOI)
}

fn find_marker(haystack: &[u8], marker: [u8; 2]) -> Option<usize> {
    haystack.windows(2).position(|w| w == marker)
}

/// Iterator over the frames of a container, see [`split_frames`].
#[derive(Debug, Clone)]
pub struct Frames<'a> {
    rest: &'a [u8],
}

impl<'a> Iterator for Frames<'a> {
    type Item = &'a [u8];

    fn next(&mut self) -> Option<Self::Item> {
        let start = find_marker(self.rest, SOI)?;
        let body = &self.rest[start + SOI.len()..];
        match find_marker(body, EOI) {
            Some(end) => {
                let frame_len = SOI.len() + end + EOI.len();
                let frame = &self.rest[start..start + frame_len];
                self.rest = &self.rest[start + frame_len..];
                Some(frame)
            }
            None => {
                // Truncated tail, e.g. power lost mid-write.
                self.rest = &[];
                None
            }
        }
    }
}

/// Split a motion-JPEG container into its frames, in file order.
///
/// Bytes outside SOI..EOI pairs are skipped and a trailing frame without an
/// end marker is dropped. Entropy-coded JPEG data byte-stuffs `0xFF`, so an
/// EOI only appears inside a frame when the frame embeds a thumbnail.
pub fn split_frames(container: &[u8]) -> Frames<'_> {
    Frames { rest: container }
}

#[cfg(test)]
mod test {
    use super::*;

    fn jpeg(fill: u8, len: usize) -> Vec<u8> {
        let mut v = SOI.to_vec();
        v.resize(len - 2, fill);
        v.extend_from_slice(&EOI);
        v
    }

    #[test]
    fn splits_back_to_back_frames_in_order() {
        let frames = [jpeg(1, 10), jpeg(2, 32), jpeg(3, 4)];
        let container: Vec<u8> = frames.concat();
        let split: Vec<&[u8]> = split_frames(&container).collect();
        assert_eq!(split.len(), 3);
        for (got, want) in split.iter().zip(frames.iter()) {
            assert_eq!(got, want);
            assert!(is_complete_jpeg(got));
        }
    }

    #[test]
    fn drops_truncated_tail() {
        let mut container = jpeg(7, 16);
        let tail = jpeg(8, 16);
        container.extend_from_slice(&tail[..9]);
        assert_eq!(split_frames(&container).count(), 1);
    }

    #[test]
    fn empty_container_has_no_frames() {
        assert_eq!(split_frames(&[]).count(), 0);
        assert!(!is_complete_jpeg(&[0xFF, 0xD8]));
    }
}
