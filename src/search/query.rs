//! Query parsing and ranked execution against a read view

use crate::search::error::{SearchError, SearchResult};
use crate::search::index::{IndexStore, ReadView};
use serde::{Deserialize, Serialize};
use tantivy::collector::{Count, TopDocs};
use tantivy::query::{Occur, Query, QueryParser};
use tantivy::query_grammar::{self, UserInputAst, UserInputLeaf};
use tantivy::DocAddress;

/// Limit used when a request does not set one
pub const DEFAULT_LIMIT: usize = 100;

/// A query against a single field
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchRequest {
    /// Target field; bare terms are matched against it
    pub field: String,

    /// Query expression
    pub expression: String,

    /// Maximum number of hits to return
    pub limit: usize,
}

impl SearchRequest {
    pub fn new(field: impl Into<String>, expression: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            expression: expression.into(),
            limit: DEFAULT_LIMIT,
        }
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }
}

/// A matching document in the read view it came from
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    pub address: DocAddress,
    pub score: f32,
}

/// Ranked hits plus the number of matches before truncation
#[derive(Debug, Clone)]
pub struct HitList {
    pub hits: Vec<Hit>,
    pub total_hits: usize,
}

/// Parses query expressions and executes them with BM25 ranking.
///
/// Grammar: bare terms, `"quoted phrases"`, `AND` / `OR` / `NOT`, `+` / `-`
/// prefixes and parentheses. Bare terms combine with OR. A bare term that
/// the analyzer splits into several tokens is matched as a phrase.
pub struct QueryEngine<'a> {
    store: &'a IndexStore,
}

impl<'a> QueryEngine<'a> {
    pub fn new(store: &'a IndexStore) -> Self {
        Self { store }
    }

    /// Parse `expression` against `field_name`
    pub fn parse(&self, field_name: &str, expression: &str) -> SearchResult<Box<dyn Query>> {
        let field = self
            .store
            .field(field_name)
            .ok_or_else(|| SearchError::QuerySyntax(format!("unknown field '{}'", field_name)))?;

        let ast = query_grammar::parse_query(expression)
            .map_err(|_| SearchError::QuerySyntax(format!("malformed expression '{}'", expression)))?;
        if let Some(other) = foreign_field(&ast, field_name) {
            return Err(SearchError::QuerySyntax(format!(
                "expression may only reference field '{}', found '{}'",
                field_name, other
            )));
        }

        let parser = QueryParser::for_index(self.store.index(), vec![field]);
        Ok(parser.build_query_from_user_input_ast(fold_negations(ast))?)
    }

    /// Run a request against a read view, best hits first
    pub fn search(&self, view: &ReadView, request: &SearchRequest) -> SearchResult<HitList> {
        let query = self.parse(&request.field, &request.expression)?;

        if request.limit == 0 {
            return Ok(HitList {
                hits: Vec::new(),
                total_hits: 0,
            });
        }

        let (top_docs, total_hits) = view
            .searcher()
            .search(&*query, &(TopDocs::with_limit(request.limit), Count))?;

        let hits = top_docs
            .into_iter()
            .map(|(score, address)| Hit { address, score })
            .collect();

        Ok(HitList { hits, total_hits })
    }
}

/// First field named by the expression other than `target`, if any
fn foreign_field<'q>(ast: &'q UserInputAst, target: &str) -> Option<&'q str> {
    match ast {
        UserInputAst::Clause(clauses) => clauses
            .iter()
            .find_map(|(_, sub)| foreign_field(sub, target)),
        UserInputAst::Boost(sub, _) => foreign_field(sub, target),
        UserInputAst::Leaf(leaf) => {
            let named = match leaf.as_ref() {
                UserInputLeaf::Literal(literal) => literal.field_name.as_deref(),
                UserInputLeaf::Range { field, .. } | UserInputLeaf::Set { field, .. } => {
                    field.as_deref()
                }
                UserInputLeaf::Exists { field } => Some(field.as_str()),
                UserInputLeaf::All => None,
            };
            named.filter(|name| *name != target)
        }
    }
}

/// `a AND NOT b` parses as `+a +(-b)`, and a clause holding only a negation
/// matches nothing. Lift such clauses into their parent as `-b`.
fn fold_negations(ast: UserInputAst) -> UserInputAst {
    match ast {
        UserInputAst::Clause(clauses) => UserInputAst::Clause(
            clauses
                .into_iter()
                .map(|(occur, sub)| match fold_negations(sub) {
                    UserInputAst::Clause(mut inner)
                        if inner.len() == 1
                            && inner[0].0 == Some(Occur::MustNot)
                            && occur != Some(Occur::MustNot) =>
                    {
                        let (_, negated) = inner.remove(0);
                        (Some(Occur::MustNot), negated)
                    }
                    folded => (occur, folded),
                })
                .collect(),
        ),
        UserInputAst::Boost(sub, boost) => UserInputAst::Boost(Box::new(fold_negations(*sub)), boost),
        leaf => leaf,
    }
}
