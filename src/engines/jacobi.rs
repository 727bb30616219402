use ndarray::{Array1, Array2};

use crate::{engines::EngineError, errors::Result};

const TOLERANCE: f64 = 1e-12;
const MAX_SWEEPS: usize = 64;

/// Cyclic Jacobi decomposition of a symmetric matrix.
///
/// Returns eigenvalues and eigenvectors as columns, in rotation order
/// (no ordering by magnitude). A matrix with non finite entries yields NaN
/// eigenvalues.
pub fn symmetric_eigen(matrix: &Array2<f64>) -> Result<(Array1<f64>, Array2<f64>)> {
    decompose(matrix, MAX_SWEEPS)
}

fn off_diagonal(a: &Array2<f64>) -> f64 {
    let n = a.nrows();
    (0..n)
        .flat_map(|i| ((i + 1)..n).map(move |j| (i, j)))
        .map(|(i, j)| a[[i, j]] * a[[i, j]])
        .sum::<f64>()
        .sqrt()
}

fn decompose(matrix: &Array2<f64>, max_sweeps: usize) -> Result<(Array1<f64>, Array2<f64>)> {
    let n = matrix.nrows();
    let mut a = matrix.clone();
    let mut v = Array2::<f64>::eye(n);
    let norm = a.iter().map(|value| value * value).sum::<f64>().sqrt();
    if !norm.is_finite() {
        return Ok((Array1::from_elem(n, f64::NAN), v));
    }

    for _ in 0..max_sweeps {
        if off_diagonal(&a) <= TOLERANCE * norm {
            break;
        }

        for p in 0..n {
            for q in (p + 1)..n {
                let (app, aqq, apq) = (a[[p, p]], a[[q, q]], a[[p, q]]);
                if apq == 0. {
                    continue;
                }
                let theta = if (app - aqq).abs() < 1e-30 {
                    std::f64::consts::FRAC_PI_4
                } else {
                    0.5 * (2. * apq / (app - aqq)).atan()
                };
                let (s, c) = theta.sin_cos();

                for k in 0..n {
                    let (akp, akq) = (a[[k, p]], a[[k, q]]);
                    a[[k, p]] = c * akp + s * akq;
                    a[[k, q]] = -s * akp + c * akq;
                }
                for k in 0..n {
                    let (apk, aqk) = (a[[p, k]], a[[q, k]]);
                    a[[p, k]] = c * apk + s * aqk;
                    a[[q, k]] = -s * apk + c * aqk;
                }
                a[[p, q]] = 0.;
                a[[q, p]] = 0.;

                for k in 0..n {
                    let (vkp, vkq) = (v[[k, p]], v[[k, q]]);
                    v[[k, p]] = c * vkp + s * vkq;
                    v[[k, q]] = -s * vkp + c * vkq;
                }
            }
        }
    }

    let residual = off_diagonal(&a);
    if residual > TOLERANCE * norm {
        Err(EngineError::NotConverged {
            sweeps: max_sweeps,
            residual: residual / norm,
        })?
    }
    Ok((a.diag().to_owned(), v))
}
