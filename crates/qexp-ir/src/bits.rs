//! The one bitstring convention used across qexp.
//!
//! **Qubit 0 is the leftmost character of a bitstring and the most
//! significant bit of the basis index.** For an n-qubit register, qubit `q`
//! lives at bit `n - 1 - q` of the index, so the index of a bitstring is its
//! plain binary value:
//!
//! ```text
//! n = 3, bitstring "110"  ->  q0 = 1, q1 = 1, q2 = 0  ->  index 6
//! ```
//!
//! Simulator readout, shot sampling, calibration labels, confusion-matrix
//! rows/columns and the Kronecker order of per-qubit matrices all go through
//! these helpers. Nothing else in the workspace converts between indices and
//! bitstrings.

use crate::error::{IrError, IrResult};

/// Widest register whose outcomes can be indexed densely (2^24 basis states).
pub const MAX_WIDTH: u32 = 24;

fn check_width(num_qubits: u32) -> IrResult<()> {
    if num_qubits > MAX_WIDTH {
        return Err(IrError::TooManyQubits {
            requested: num_qubits,
            max: MAX_WIDTH,
        });
    }
    Ok(())
}

/// Bit mask selecting `qubit` in a basis index of an `num_qubits` register.
#[inline]
pub fn qubit_mask(num_qubits: u32, qubit: u32) -> usize {
    debug_assert!(qubit < num_qubits);
    1usize << (num_qubits - 1 - qubit)
}

/// Value (0 or 1) of `qubit` in basis index `index`.
#[inline]
pub fn bit_of(index: usize, num_qubits: u32, qubit: u32) -> u8 {
    u8::from(index & qubit_mask(num_qubits, qubit) != 0)
}

/// Render a basis index as a bitstring of width `num_qubits`.
pub fn index_to_bitstring(index: usize, num_qubits: u32) -> String {
    format!("{:0width$b}", index, width = num_qubits as usize)
}

/// Parse a bitstring of width `num_qubits` into its basis index.
pub fn bitstring_to_index(bitstring: &str, num_qubits: u32) -> IrResult<usize> {
    let invalid = || IrError::InvalidBitstring {
        bitstring: bitstring.to_string(),
        num_qubits,
    };
    if bitstring.len() != num_qubits as usize {
        return Err(invalid());
    }
    check_width(num_qubits)?;
    bitstring.bytes().try_fold(0usize, |acc, b| match b {
        b'0' => Ok(acc << 1),
        b'1' => Ok((acc << 1) | 1),
        _ => Err(invalid()),
    })
}

/// Check that `bitstring` is made of '0'/'1' and return its width.
///
/// Widths above [`MAX_WIDTH`] are rejected with [`IrError::TooManyQubits`].
pub fn bitstring_width(bitstring: &str) -> IrResult<u32> {
    let width = u32::try_from(bitstring.len()).unwrap_or(u32::MAX);
    check_width(width)?;
    if bitstring.is_empty() || !bitstring.bytes().all(|b| b == b'0' || b == b'1') {
        return Err(IrError::InvalidBitstring {
            bitstring: bitstring.to_string(),
            num_qubits: width,
        });
    }
    Ok(width)
}

/// Restrict a bitstring to the given qubits, in the order listed.
///
/// `marginal_bitstring("1010", &[0, 2])` is `"11"`.
pub fn marginal_bitstring(bitstring: &str, qubits: &[u32]) -> IrResult<String> {
    let bytes = bitstring.as_bytes();
    qubits
        .iter()
        .map(|&q| match bytes.get(q as usize) {
            Some(b'0') => Ok('0'),
            Some(b'1') => Ok('1'),
            _ => Err(IrError::InvalidBitstring {
                bitstring: bitstring.to_string(),
                num_qubits: bitstring.len() as u32,
            }),
        })
        .collect()
}

/// Parity (+1 for even, -1 for odd) of the listed qubits in `index`.
pub fn parity_sign(index: usize, num_qubits: u32, qubits: &[u32]) -> f64 {
    let ones: u32 = qubits
        .iter()
        .map(|&q| u32::from(bit_of(index, num_qubits, q)))
        .sum();
    if ones % 2 == 0 { 1.0 } else { -1.0 }
}
