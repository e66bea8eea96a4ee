use proc_macro::TokenStream;
use proc_macro2::{Span, TokenStream as TokenStream2};
use quote::{quote, ToTokens};
use syn::{
    parse_macro_input, spanned::Spanned, BinOp, Block, Expr, ExprLit, Ident, Pat, Stmt, UnOp,
};

/// Build an expression graph from plain `let` statements.
///
/// ```ignore
/// pathgrad! {{
///     let a = 2.;
///     let b = 3.;
///     let f = a * b + sin(a);
/// }}
/// ```
///
/// Literal bindings become leaf terms named after the binding. Arithmetic
/// and calls to `sin`, `exp` and `ln` become calls to the operator library.
/// Any other function `foo` is applied with `Term::apply`, which expects a
/// `foo_derive` function next to it.
#[proc_macro]
pub fn pathgrad(input: TokenStream) -> TokenStream {
    // Parse the input tokens into a syntax tree
    let input = parse_macro_input!(input as Block);

    let mut objs = vec![];

    for stmt in &input.stmts {
        traverse_stmt(stmt, &mut objs);
    }

    let expanded = quote! {
        #(#objs)*
    };

    TokenStream::from(expanded)
}

fn traverse_stmt(input: &Stmt, terms: &mut Vec<TokenStream2>) {
    if let Err(e) = traverse_stmt_inner(input, terms) {
        terms.push(e.to_compile_error());
    }
}

fn traverse_stmt_inner(input: &Stmt, terms: &mut Vec<TokenStream2>) -> syn::Result<()> {
    match input {
        Stmt::Local(local) => {
            let (Pat::Ident(id), Some(init)) = (&local.pat, &local.init) else {
                return Err(syn::Error::new_spanned(
                    local,
                    "expected `let <name> = <expression>;`",
                ));
            };
            let name = id.ident.clone();
            let ex = &init.expr;
            let ts = match ex as &Expr {
                Expr::Lit(lit) => quote! {
                    let #name = ::pathgrad::Term::new(stringify!(#name), (#lit) as f64);
                },
                Expr::Unary(un) if is_negative_literal(ex) => quote! {
                    let #name = ::pathgrad::Term::new(stringify!(#name), (#un) as f64);
                },
                _ => {
                    let res = traverse_expr(ex, terms)?;
                    quote! {
                        let #name = #res.renamed(stringify!(#name));
                    }
                }
            };
            terms.push(ts);
            Ok(())
        }
        Stmt::Expr(ex, _) => traverse_expr(ex, terms).map(|_| ()),
        _ => Err(syn::Error::new_spanned(input, "unsupported statement")),
    }
}

fn is_negative_literal(ex: &Expr) -> bool {
    matches!(ex, Expr::Unary(un) if matches!(un.op, UnOp::Neg(_)) && matches!(*un.expr, Expr::Lit(_)))
}

fn var_name(terms: &[TokenStream2]) -> String {
    format!("_a{}", terms.len())
}

fn bind(ts: TokenStream2, span: Span, terms: &mut Vec<TokenStream2>) -> Ident {
    let name = Ident::new(&var_name(terms), span);
    terms.push(quote! {
        let #name = #ts;
    });
    name
}

fn format_term(ex: &ExprLit, terms: &mut Vec<TokenStream2>) -> Ident {
    let name = Ident::new(&var_name(terms), ex.span());
    let ts = quote! {
        let #name = ::pathgrad::Term::new(stringify!(#name), (#ex) as f64);
    };
    terms.push(ts);
    name
}

fn unsupported(ex: &impl ToTokens) -> syn::Error {
    syn::Error::new_spanned(ex, "unsupported expression")
}

fn traverse_expr(input: &Expr, terms: &mut Vec<TokenStream2>) -> syn::Result<Ident> {
    match input {
        Expr::Binary(ex) => {
            let lhs = traverse_expr(&ex.left, terms)?;
            let rhs = traverse_expr(&ex.right, terms)?;
            let func = match ex.op {
                BinOp::Add(_) => quote! { ::pathgrad::add },
                BinOp::Sub(_) => quote! { ::pathgrad::subtract },
                BinOp::Mul(_) => quote! { ::pathgrad::multiply },
                BinOp::Div(_) => quote! { ::pathgrad::divide },
                _ => return Err(unsupported(ex)),
            };
            Ok(bind(quote! { #func(&#lhs, &#rhs) }, ex.span(), terms))
        }
        Expr::Unary(ex) => match ex.op {
            UnOp::Neg(_) => {
                let term = traverse_expr(&ex.expr, terms)?;
                Ok(bind(quote! { ::pathgrad::negate(&#term) }, ex.span(), terms))
            }
            _ => Err(unsupported(ex)),
        },
        Expr::Paren(ex) => traverse_expr(&ex.expr, terms),
        Expr::Lit(lit) => Ok(format_term(lit, terms)),
        Expr::Path(path) => path
            .path
            .get_ident()
            .cloned()
            .ok_or_else(|| unsupported(path)),
        Expr::Call(call) => {
            let (Expr::Path(func), Some(arg), 1) =
                (&call.func as &Expr, call.args.first(), call.args.len())
            else {
                return Err(unsupported(call));
            };
            let arg = traverse_expr(arg, terms)?;
            let func_name = func
                .path
                .segments
                .last()
                .ok_or_else(|| unsupported(func))?
                .ident
                .to_string();
            let ts = match func_name.as_str() {
                "sin" => quote! { ::pathgrad::sine(&#arg) },
                "exp" => quote! { ::pathgrad::exponential(&#arg) },
                "ln" => quote! { ::pathgrad::natural_log(&#arg) },
                _ => {
                    let mut func_derive = func.clone();
                    if let Some(seg) = func_derive.path.segments.last_mut() {
                        seg.ident = Ident::new(&format!("{}_derive", seg.ident), func.span());
                    }
                    quote! { #arg.apply(stringify!(#func), #func, #func_derive) }
                }
            };
            Ok(bind(ts, call.span(), terms))
        }
        _ => Err(unsupported(input)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use syn::parse_quote;

    fn expand(stmt: Stmt) -> String {
        let mut terms = vec![];
        traverse_stmt(&stmt, &mut terms);
        quote! { #(#terms)* }.to_string()
    }

    #[test]
    fn unsupported_operator_is_a_compile_error() {
        let out = expand(parse_quote! { let f = a % b; });
        assert!(out.contains("compile_error"), "{out}");
        assert!(out.contains("unsupported expression"), "{out}");
        assert!(!out.contains("Term :: new"), "{out}");
    }

    #[test]
    fn unsupported_unary_and_method_calls() {
        for stmt in [
            parse_quote! { let f = !a; },
            parse_quote! { let f = a.sin(); },
            parse_quote! { let f = sin(a, b); },
        ] {
            let out = expand(stmt);
            assert!(out.contains("compile_error"), "{out}");
        }
    }

    #[test]
    fn alias_is_renamed() {
        let out = expand(parse_quote! { let f = a; });
        assert_eq!(out, quote! { let f = a.renamed(stringify!(f)); }.to_string());
    }

    #[test]
    fn literal_is_a_leaf() {
        let out = expand(parse_quote! { let a = -1.; });
        assert!(out.contains(":: pathgrad :: Term :: new"), "{out}");
        assert!(!out.contains("negate"), "{out}");
    }
}
