use named_einsum::{backend::Naive, einsum, Einsum, EinsumConfig, Error};
use ndarray::{array, Array, Array2, Array3, Axis};

#[test]
fn matvec() {
    let a = array![[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]];
    let x = array![1.0, 0.0, -1.0];
    let y = einsum("A[row, col], x[col] -> y[row]", &[&a, &x]).unwrap();
    assert_eq!(y, a.dot(&x).into_dyn());
}

#[test]
fn khatri_rao() {
    let c = array![[1.0, 2.0], [3.0, 4.0]];
    let d = array![[1.0, 10.0], [2.0, 20.0], [3.0, 30.0]];
    let krp = einsum("C[i, r], D[j, r] -> KRP[i * j, r]", &[&c, &d]).unwrap();
    assert_eq!(krp.shape(), &[6, 2]);
    for i in 0..2 {
        for j in 0..3 {
            for r in 0..2 {
                assert_eq!(krp[[i * 3 + j, r]], c[[i, r]] * d[[j, r]]);
            }
        }
    }
}

#[test]
fn tensor_times_matrix() {
    let t: Array3<f64> = Array::from_shape_fn((2, 3, 4), |(i, j, k)| (i * 12 + j * 4 + k) as f64);
    let m: Array2<f64> = Array::from_shape_fn((4, 5), |(k, l)| (k + l) as f64);
    let y = einsum("T[i, j, k], M[k, l] -> Y[i, j, l]", &[&t, &m]).unwrap();
    assert_eq!(y.shape(), &[2, 3, 5]);
    for i in 0..2 {
        let expected = t.index_axis(Axis(0), i).dot(&m);
        assert_eq!(y.index_axis(Axis(0), i), expected.into_dyn());
    }
}

#[test]
fn unfolded_weight() {
    // W is the unfolding of a (2, 3, r) tensor
    let t: Array3<f64> = Array::ones((2, 3, 4));
    let w: Array2<f64> = Array::from_shape_fn((6, 5), |(ij, r)| (ij * r) as f64);
    let y = einsum("T[i, j, k], W[i * j, r] -> Y[k, r]", &[&t, &w]).unwrap();
    assert_eq!(y.shape(), &[4, 5]);
    let column_sums = w.sum_axis(Axis(0));
    for k in 0..4 {
        assert_eq!(y.index_axis(Axis(0), k), column_sums.view().into_dyn());
    }
}

#[test]
fn inferred_factor() {
    let x = Array::from_shape_vec(6, (0..6).map(f64::from).collect()).unwrap();
    let y = array![1.0, 1.0];
    // i = 2 from y, then j = 6 / 2
    let z = einsum("x[i * j], y[i] -> z[j]", &[&x, &y]).unwrap();
    assert_eq!(z, array![3.0, 5.0, 7.0].into_dyn());
}

#[test]
fn batched_ellipsis() {
    let x: Array3<f64> = Array::ones((5, 2, 3));
    let w = array![[1.0, 2.0], [3.0, 4.0], [5.0, 6.0]];
    let y = einsum("x[..., feature], w[feature, hidden] -> y[..., hidden]", &[&x, &w]).unwrap();
    assert_eq!(y.shape(), &[5, 2, 2]);
    assert!(y.lanes(Axis(2)).into_iter().all(|lane| lane == array![9.0, 12.0]));
}

#[test]
fn product_of_ellipsis_free_output() {
    let x: Array3<f64> = Array::from_shape_fn((2, 3, 4), |(a, b, c)| (a + b + c) as f64);
    let y = einsum("x[a, b, c] -> y[a * b * c]", &[&x]).unwrap();
    assert_eq!(y, x.into_shape(24).unwrap().into_dyn());
}

#[test]
fn reduce_to_scalar() {
    let x = array![[1.0, 2.0], [3.0, 4.0]];
    let s = einsum("x[i, j] ->", &[&x]).unwrap();
    assert_eq!(s.ndim(), 0);
    assert_eq!(s.sum(), 10.0);
}

#[test]
fn errors() {
    let a = array![[1.0, 2.0], [3.0, 4.0]];
    let b = array![1.0, 2.0, 3.0];

    let err = einsum("A[i, j], b[j] -> c[i]", &[&a, &b]).unwrap_err();
    assert!(matches!(err, Error::InconsistentAxisSize { axis, .. } if axis == "j"));

    let err = einsum("A[i, j], b[j] -> c[i]", &[&a]).unwrap_err();
    assert!(matches!(err, Error::OperandCountMismatch { expected: 2, found: 1 }));

    let err = einsum("A[i, j, k] ->", &[&a]).unwrap_err();
    assert!(matches!(err, Error::InconsistentShapeDefinition { .. }));

    let err = einsum("A[i, j] -> B[i, k]", &[&a]).unwrap_err();
    assert!(matches!(err, Error::AxisNotFound { .. }));

    let err = einsum("A[i, j] -> B[i, 1]", &[&a]).unwrap_err();
    assert!(matches!(err, Error::Parse { .. }));

    let err = einsum("x[i * j] -> y[i, j]", &[&b]).unwrap_err();
    assert!(matches!(err, Error::UnresolvedAxisSize { .. }));
}

#[test]
fn skip_validation() {
    let einsum = Einsum::with_config(Naive, EinsumConfig::fast());
    let a = array![[1.0, 2.0], [3.0, 4.0]];
    let t = einsum.contract("A[i, i] ->", &[&a]).unwrap();
    assert_eq!(t.sum(), 5.0);
}
