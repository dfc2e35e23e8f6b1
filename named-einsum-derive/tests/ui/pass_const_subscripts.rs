use named_einsum_derive::subscripts;

const OUTER: &str = subscripts!("x[i], y[j] -> z[i, j]");

fn main() {
    assert_eq!(OUTER, "A,B->AB");
}
