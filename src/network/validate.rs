//! Network validation.

use crate::error::{Result, TransportError};

/// Validate throat connections against the pore count.
///
/// Checks:
/// - Both ends of every throat are existing pores
/// - No throat connects a pore to itself
pub fn validate_connections(num_pores: usize, conns: &[[usize; 2]]) -> Result<()> {
    for (t, &[p1, p2]) in conns.iter().enumerate() {
        if p1 >= num_pores || p2 >= num_pores {
            return Err(TransportError::topology(format!(
                "throat {} joins pores {} and {} but the network has {} pores",
                t, p1, p2, num_pores
            )));
        }
        if p1 == p2 {
            return Err(TransportError::topology(format!(
                "throat {} connects pore {} to itself",
                t, p1
            )));
        }
    }
    Ok(())
}

/// Check that every pore index is inside `[0, count)`.
pub fn check_pores(pores: &[usize], count: usize) -> Result<()> {
    match pores.iter().find(|&&p| p >= count) {
        Some(&index) => Err(TransportError::PoreOutOfRange { index, count }),
        None => Ok(()),
    }
}

/// Check that every throat index is inside `[0, count)`.
pub fn check_throats(throats: &[usize], count: usize) -> Result<()> {
    match throats.iter().find(|&&t| t >= count) {
        Some(&index) => Err(TransportError::ThroatOutOfRange { index, count }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_self_loop() {
        let err = validate_connections(3, &[[0, 1], [2, 2]]).unwrap_err();
        assert!(err.to_string().contains("itself"));
    }

    #[test]
    fn test_rejects_dangling_throat() {
        assert!(validate_connections(2, &[[0, 2]]).is_err());
        assert!(validate_connections(3, &[[0, 2]]).is_ok());
    }

    #[test]
    fn test_check_pores_reports_first_bad_index() {
        let err = check_pores(&[0, 5, 9], 4).unwrap_err();
        assert!(matches!(
            err,
            TransportError::PoreOutOfRange { index: 5, count: 4 }
        ));
    }
}
