use proc_macro2::TokenStream;
use quote::{quote, ToTokens};
use regex_sim_transformer::{build_automata, Automaton, Budget, Dfa};
use syn::{parse_macro_input, LitStr};

/// Compiles a pattern to a `regex_sim_util::DfaTable` during macro expansion.
///
/// ```ignore
/// const fn is_classic(s: &str) -> bool {
///     automaton!("(a|b)*abb").test(s)
/// }
/// ```
#[proc_macro]
pub fn automaton(input: proc_macro::TokenStream) -> proc_macro::TokenStream {
    let lit = parse_macro_input!(input as LitStr);
    let pattern = lit.value();

    match build_automata(&pattern, &Budget::default()) {
        Ok(automata) => Table { dfa: &automata.dfa }.into_token_stream().into(),
        Err(e) => syn::Error::new(lit.span(), format!("invalid pattern {pattern:?}: {e}"))
            .to_compile_error()
            .into(),
    }
}

struct Table<'a> {
    dfa: &'a Dfa,
}

impl ToTokens for Table<'_> {
    fn to_tokens(&self, tokens: &mut TokenStream) {
        let initial = self.dfa.initial();
        let accepting = (0..self.dfa.state_count()).map(|s| self.dfa.is_accepting(s));
        let rows = self.dfa.states().iter().map(|state| Row {
            transitions: state.transitions(),
        });

        tokens.extend(quote! {
            {
                const TABLE: ::regex_sim_util::DfaTable = ::regex_sim_util::DfaTable {
                    initial: #initial,
                    accepting: &[#(#accepting),*],
                    transitions: &[#(#rows),*],
                };
                TABLE
            }
        });
    }
}

struct Row<'a> {
    transitions: &'a [(char, usize)],
}

impl ToTokens for Row<'_> {
    fn to_tokens(&self, tokens: &mut TokenStream) {
        let pairs = self.transitions.iter().map(|&(c, target)| {
            let scalar = c as u32;
            quote! { (#scalar, #target) }
        });
        tokens.extend(quote! { &[#(#pairs),*] });
    }
}
