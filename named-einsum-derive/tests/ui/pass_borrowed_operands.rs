use named_einsum_derive::einsum;
use ndarray::array;

fn main() {
    let a = array![[1.0_f32, 2.0], [3.0, 4.0]];
    let x = array![1.0_f32, 1.0];
    // views and references are operands as well as owned arrays
    let y = einsum!("A[i, j], x[j] -> y[i]", a.view(), &x).unwrap();
    assert_eq!(y, array![3.0_f32, 7.0].into_dyn());
}
