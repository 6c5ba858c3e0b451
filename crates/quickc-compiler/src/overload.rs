//! Overload resolution.
//!
//! A candidate is applicable when it has as many parameters as there are
//! arguments and every argument converts implicitly to its parameter. Among
//! applicable candidates the best one must be at least as good for every
//! argument and strictly better for one (see [`is_better_conversion`]).

use quickc_core::DataType;

use crate::conversion::{is_better_conversion, is_implicitly_convertible};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OverloadError {
    /// No candidate takes this many arguments.
    NoArity,
    /// Candidates of the right arity exist, but the first one rejects
    /// argument `index` (0-based), expecting `expected`.
    Mismatch { index: usize, expected: DataType },
    /// Two candidates (by position) are equally good.
    Ambiguous(usize, usize),
}

/// Pick the best of `candidates` for `args`, returning its position.
pub fn resolve_overload<'p, I>(candidates: I, args: &[DataType]) -> Result<usize, OverloadError>
where
    I: IntoIterator<Item = &'p [DataType]>,
{
    let candidates: Vec<&[DataType]> = candidates.into_iter().collect();

    let with_arity: Vec<usize> = (0..candidates.len())
        .filter(|&i| candidates[i].len() == args.len())
        .collect();
    let Some(&first) = with_arity.first() else {
        return Err(OverloadError::NoArity);
    };

    let applicable: Vec<usize> = with_arity
        .iter()
        .copied()
        .filter(|&i| {
            candidates[i]
                .iter()
                .zip(args)
                .all(|(param, arg)| is_implicitly_convertible(*arg, *param))
        })
        .collect();

    let best = match applicable.as_slice() {
        [] => {
            let (index, expected) = candidates[first]
                .iter()
                .zip(args)
                .enumerate()
                .find(|(_, (param, arg))| !is_implicitly_convertible(**arg, **param))
                .map(|(index, (param, _))| (index, *param))
                .unwrap_or((0, DataType::Void));
            return Err(OverloadError::Mismatch { index, expected });
        }
        [only] => return Ok(*only),
        many => many,
    };

    let better = |a: usize, b: usize| -> bool {
        let (pa, pb) = (candidates[a], candidates[b]);
        let mut strictly = false;
        for (k, arg) in args.iter().enumerate() {
            if is_better_conversion(*arg, pb[k], pa[k]) {
                return false;
            }
            strictly |= is_better_conversion(*arg, pa[k], pb[k]);
        }
        strictly
    };

    for &candidate in best {
        if best.iter().all(|&other| other == candidate || better(candidate, other)) {
            return Ok(candidate);
        }
    }
    Err(OverloadError::Ambiguous(best[0], best[1]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use DataType::*;

    fn resolve(candidates: &[&[DataType]], args: &[DataType]) -> Result<usize, OverloadError> {
        resolve_overload(candidates.iter().copied(), args)
    }

    #[test]
    fn exact_match_wins() {
        let candidates: &[&[DataType]] = &[&[Long], &[Int], &[Double]];
        assert_eq!(resolve(candidates, &[Int]), Ok(1));
        assert_eq!(resolve(candidates, &[Long]), Ok(0));
    }

    #[test]
    fn narrowest_widening_wins() {
        let candidates: &[&[DataType]] = &[&[Double, Double], &[Long, Long]];
        assert_eq!(resolve(candidates, &[Int, Long]), Ok(1));
    }

    #[test]
    fn arity_and_type_errors() {
        let candidates: &[&[DataType]] = &[&[String]];
        assert_eq!(resolve(candidates, &[]), Err(OverloadError::NoArity));
        assert_eq!(
            resolve(candidates, &[Int]),
            Err(OverloadError::Mismatch { index: 0, expected: String })
        );
    }

    #[test]
    fn crossed_widenings_are_ambiguous() {
        let candidates: &[&[DataType]] = &[&[Int, Long], &[Long, Int]];
        assert_eq!(resolve(candidates, &[Int, Int]), Err(OverloadError::Ambiguous(0, 1)));
    }
}
