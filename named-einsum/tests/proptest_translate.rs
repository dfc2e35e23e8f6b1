//! Property tests for the translation into positional subscripts

use named_einsum::{einsum, parse, symbols::ALPHABET, translate};
use ndarray::{Array, Array2};
use proptest::prelude::*;

fn axis_names() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec("[a-z][a-z0-9_]{0,4}", 1..6)
}

proptest! {
    /// Translation is a pure function of the text
    #[test]
    fn deterministic(names in axis_names()) {
        let notation = format!("[{}] ->", names.join(", "));
        prop_assert_eq!(translate(&notation).unwrap(), translate(&notation).unwrap());
    }

    /// Symbols are issued in the order of first occurrence
    #[test]
    fn first_occurrence_order(names in axis_names()) {
        let notation = format!("A[{}], B[{}] ->", names.join(", "), names.join(", "));
        let parsed = parse(&notation).unwrap();
        let mut unique: Vec<&str> = Vec::new();
        for name in &names {
            if !unique.contains(&name.as_str()) {
                unique.push(name);
            }
        }
        for (n, name) in unique.iter().enumerate() {
            prop_assert_eq!(parsed.symbol(name), Some(ALPHABET[n] as char));
        }
        let input: String = names.iter().map(|name| parsed.symbol(name).unwrap()).collect();
        prop_assert_eq!(parsed.subscripts(), format!("{},{}->", input, input));
    }

    /// Axis names do not change the contraction
    #[test]
    fn renaming_invariant(n in 1usize..4, m in 1usize..4, k in 1usize..4) {
        let a: Array2<f64> = Array::from_shape_fn((n, m), |(i, j)| (i + 2 * j) as f64);
        let b: Array2<f64> = Array::from_shape_fn((m, k), |(i, j)| (3 * i + j) as f64);
        let c1 = einsum("A[i, j], B[j, k] -> C[i, k]", &[&a, &b]).unwrap();
        let c2 = einsum("[row, inner], [inner, col] -> [row, col]", &[&a, &b]).unwrap();
        prop_assert_eq!(&c1, &c2);
        prop_assert_eq!(c1, a.dot(&b).into_dyn());
    }
}
