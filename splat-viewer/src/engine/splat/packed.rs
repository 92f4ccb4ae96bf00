use bytemuck::{Pod, Zeroable};
use constants::splat::SPLAT_RECORD_SIZE;

use super::{DecodeError, SplatCloud};

/// One little-endian record of the packed `.splat` format.
/// Scale and rotation only pad the layout; the point renderer ignores them.
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
#[allow(dead_code)]
struct SplatRecord {
    position: [f32; 3],
    scale: [f32; 3],
    color: [u8; 4],
    rotation: [u8; 4],
}

const _: () = assert!(std::mem::size_of::<SplatRecord>() == SPLAT_RECORD_SIZE);

pub fn decode_packed(data: &[u8]) -> Result<SplatCloud, DecodeError> {
    if data.len() % SPLAT_RECORD_SIZE != 0 {
        return Err(DecodeError::TrailingBytes {
            len: data.len(),
            record_size: SPLAT_RECORD_SIZE,
        });
    }

    let mut cloud = SplatCloud::with_capacity(data.len() / SPLAT_RECORD_SIZE);
    for chunk in data.chunks_exact(SPLAT_RECORD_SIZE) {
        // Blob buffers carry no alignment guarantee.
        let record: SplatRecord = bytemuck::pod_read_unaligned(chunk);
        cloud.push(record.position, record.color.map(|c| c as f32 / 255.0));
    }
    Ok(cloud)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(position: [f32; 3], color: [u8; 4]) -> Vec<u8> {
        bytemuck::bytes_of(&SplatRecord {
            position,
            scale: [0.01; 3],
            color,
            rotation: [128, 128, 128, 255],
        })
        .to_vec()
    }

    #[test]
    fn decodes_records_in_order() {
        let mut data = record([1.0, 2.0, 3.0], [255, 0, 0, 255]);
        data.extend(record([-1.0, 0.0, 0.5], [0, 0, 255, 0]));
        // Offset by one byte to exercise unaligned reads.
        let mut shifted = vec![0u8];
        shifted.extend_from_slice(&data);

        let cloud = decode_packed(&shifted[1..]).unwrap();
        assert_eq!(cloud.positions, vec![[1.0, 2.0, 3.0], [-1.0, 0.0, 0.5]]);
        assert_eq!(cloud.colors[0], [1.0, 0.0, 0.0, 1.0]);
        assert_eq!(cloud.colors[1], [0.0, 0.0, 1.0, 0.0]);
    }

    #[test]
    fn partial_record_is_rejected() {
        let mut data = record([0.0; 3], [0; 4]);
        data.pop();
        assert_eq!(
            decode_packed(&data).unwrap_err(),
            DecodeError::TrailingBytes {
                len: 31,
                record_size: 32
            }
        );
    }
}
