use named_einsum_derive::{einsum, subscripts};
use ndarray::{array, Array3};

#[test]
fn matmul() {
    let a = array![[1.0, 2.0], [3.0, 4.0]];
    let b = array![[1.0, 2.0], [3.0, 4.0]];
    let c = einsum!("A[i, j], B[j, k] -> C[i, k]", a, b).unwrap();
    assert_eq!(c, array![[7.0, 10.0], [15.0, 22.0]].into_dyn());
}

#[test]
fn batched_matmul() {
    let a = Array3::<f64>::ones((3, 2, 4));
    let b = array![[1.0], [1.0], [1.0], [1.0]];
    let c = einsum!("A[..., i, j], B[j, k] -> C[..., i, k]", a, b).unwrap();
    assert_eq!(c.shape(), &[3, 2, 1]);
    assert!(c.iter().all(|&x| x == 4.0));
}

#[test]
fn shape_mismatch_at_runtime() {
    let a = array![[1.0, 2.0], [3.0, 4.0]];
    let b = array![1.0, 2.0, 3.0];
    let err = einsum!("A[i, j], b[j] -> c[i]", a, b).unwrap_err();
    assert!(matches!(err, named_einsum::Error::InconsistentAxisSize { .. }));
}

#[test]
fn subscripts_literal() {
    assert_eq!(subscripts!("[a] ->"), "A->");
    assert_eq!(
        subscripts!("[batch, ..., feature], [feature] -> [batch, ...]"),
        "A...B,B->A..."
    );
}
