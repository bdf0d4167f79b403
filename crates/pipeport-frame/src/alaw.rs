//! G.711 A-law companding.
//!
//! Each 16-bit linear sample maps to one 8-bit code and back. The mapping is
//! lossy: a decoded sample lies at the midpoint of the quantization step its
//! code covers, so the error grows with the segment (8 for the two smallest
//! segments, up to 512 for the largest).

const SIGN_BIT: u8 = 0x80;
const QUANT_MASK: u8 = 0x0F;
const SEG_SHIFT: u32 = 4;
const SEG_MASK: u8 = 0x70;

/// Upper bound of each segment, in 13-bit magnitude units.
const SEG_END: [i32; 8] = [0x1F, 0x3F, 0x7F, 0xFF, 0x1FF, 0x3FF, 0x7FF, 0xFFF];

/// Every A-law code decoded once at compile time.
const DECODE_TABLE: [i16; 256] = build_decode_table();

const fn build_decode_table() -> [i16; 256] {
    let mut table = [0i16; 256];
    let mut code = 0usize;
    while code < 256 {
        table[code] = decode_code(code as u8);
        code += 1;
    }
    table
}

const fn decode_code(code: u8) -> i16 {
    let code = code ^ 0x55;
    let mut magnitude = ((code & QUANT_MASK) as i32) << 4;
    let segment = ((code & SEG_MASK) >> SEG_SHIFT) as i32;
    match segment {
        0 => magnitude += 8,
        1 => magnitude += 0x108,
        _ => {
            magnitude += 0x108;
            magnitude <<= segment - 1;
        }
    }
    if code & SIGN_BIT != 0 {
        magnitude as i16
    } else {
        -magnitude as i16
    }
}

/// Encode one linear sample.
pub fn linear_to_alaw(sample: i16) -> u8 {
    let mut value = i32::from(sample) >> 3;
    let mask: u8 = if value >= 0 {
        0xD5
    } else {
        value = -value - 1;
        0x55
    };

    let segment = SEG_END
        .iter()
        .position(|&end| value <= end)
        .unwrap_or(SEG_END.len());

    if segment >= SEG_END.len() {
        return 0x7F ^ mask;
    }

    let mut code = (segment as u8) << SEG_SHIFT;
    if segment < 2 {
        code |= ((value >> 1) as u8) & QUANT_MASK;
    } else {
        code |= ((value >> segment) as u8) & QUANT_MASK;
    }
    code ^ mask
}

/// Decode one A-law code.
pub fn alaw_to_linear(code: u8) -> i16 {
    DECODE_TABLE[code as usize]
}

/// Encode `src` into `dst`, one byte per sample, in order.
///
/// Encodes `min(src.len(), dst.len())` samples and returns that count.
pub fn encode(src: &[i16], dst: &mut [u8]) -> usize {
    let count = src.len().min(dst.len());
    for (out, &sample) in dst.iter_mut().zip(src).take(count) {
        *out = linear_to_alaw(sample);
    }
    count
}

/// Decode `src` into `dst`, one sample per byte, in order.
///
/// Decodes `min(src.len(), dst.len())` codes and returns that count.
pub fn decode(src: &[u8], dst: &mut [i16]) -> usize {
    let count = src.len().min(dst.len());
    for (out, &code) in dst.iter_mut().zip(src).take(count) {
        *out = alaw_to_linear(code);
    }
    count
}
