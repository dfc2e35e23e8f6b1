//! proc-macro for named einsum checked at compile time
//!
//! The notation is compiled while the macro expands,
//! so that a syntax error, an output axis missing from inputs,
//! or a wrong number of operands is reported as a compile error.

use named_einsum::ParsedExpression;
use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use proc_macro_error::{abort, proc_macro_error};
use quote::quote;
use syn::parse::Parser;

/// Positional subscripts of named einsum notation as a string literal
///
/// ```
/// use named_einsum_derive::subscripts;
///
/// const MATMUL: &str = subscripts!("A[i, j], B[j, k] -> C[i, k]");
/// assert_eq!(MATMUL, "AB,BC->AC");
/// ```
///
/// An invalid notation is a compile error:
///
/// ```compile_fail
/// use named_einsum_derive::subscripts;
///
/// let s = subscripts!("A[i, j] -> B[k]" /* k is not an input axis */);
/// ```
#[proc_macro_error]
#[proc_macro]
pub fn subscripts(input: TokenStream) -> TokenStream {
    match expand_subscripts(input.into()) {
        Ok(tt) => tt.into(),
        Err(err) => abort!(err),
    }
}

/// Named einsum evaluated with the naive loops of [named_einsum::einsum]
///
/// ```
/// use ndarray::array;
/// use named_einsum_derive::einsum;
///
/// let a = array![
///   [1.0, 2.0],
///   [3.0, 4.0]
/// ];
/// let b = array![
///   [1.0, 2.0],
///   [3.0, 4.0]
/// ];
/// let c = einsum!("A[i, j], B[j, k] -> C[i, k]", a, b).unwrap();
/// assert_eq!(c, array![
///   [7.0, 10.0],
///   [15.0, 22.0]
/// ].into_dyn());
/// ```
///
/// The shapes are only known at runtime, and checked when evaluated,
/// which is why this returns [named_einsum::Result].
///
/// Examples
/// ---------
///
/// - Take diagonal elements
///
///   ```
///   use ndarray::array;
///   use named_einsum_derive::einsum;
///
///   let a = array![[1.0, 2.0], [3.0, 4.0]];
///   let d = einsum!("A[i, i] -> d[i]", a).unwrap();
///   assert_eq!(d, array![1.0, 4.0].into_dyn());
///   ```
///
/// - If the notation and the number of input mismatches,
///   this raises compile error:
///
///   ```compile_fail
///   use ndarray::array;
///   use named_einsum_derive::einsum;
///
///   let a = array![
///     [1.0, 2.0],
///     [3.0, 4.0]
///   ];
///   let c = einsum!("A[i, j], B[j, k] -> C[i, k]", a /* needs one more arg */);
///   ```
///
#[proc_macro_error]
#[proc_macro]
pub fn einsum(input: TokenStream) -> TokenStream {
    match expand_einsum(input.into()) {
        Ok(tt) => tt.into(),
        Err(err) => abort!(err),
    }
}

fn expand_subscripts(input: TokenStream2) -> syn::Result<TokenStream2> {
    let lit: syn::LitStr = syn::parse2(input)?;
    let parsed = compile(&lit)?;
    let subscripts = parsed.subscripts();
    Ok(quote! { #subscripts })
}

fn expand_einsum(input: TokenStream2) -> syn::Result<TokenStream2> {
    let (lit, args) = parse(input)?;
    let parsed = compile(&lit)?;
    if parsed.num_inputs() != args.len() {
        return Err(syn::Error::new(
            lit.span(),
            format!(
                "Argument number mismatch: subscripts ({}), args ({})",
                parsed.num_inputs(),
                args.len()
            ),
        ));
    }
    Ok(quote! {
        ::named_einsum::einsum(#lit, &[#(&#args),*])
    })
}

fn compile(lit: &syn::LitStr) -> syn::Result<ParsedExpression> {
    lit.value()
        .parse()
        .map_err(|err: named_einsum::Error| syn::Error::new(lit.span(), err.to_string()))
}

fn parse(input: TokenStream2) -> syn::Result<(syn::LitStr, Vec<syn::Expr>)> {
    let parser = syn::punctuated::Punctuated::<syn::Expr, syn::Token![,]>::parse_terminated;
    let args = parser.parse2(input)?;
    let mut iter = args.into_iter();
    let lit = match iter.next() {
        Some(syn::Expr::Lit(syn::ExprLit {
            lit: syn::Lit::Str(lit),
            attrs: _,
        })) => lit,
        Some(expr) => {
            return Err(syn::Error::new_spanned(
                expr,
                "einsum! must start with notation string literal",
            ))
        }
        None => {
            return Err(syn::Error::new(
                proc_macro2::Span::call_site(),
                "einsum! must start with notation string literal",
            ))
        }
    };
    Ok((lit, iter.collect()))
}
