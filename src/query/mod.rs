//! Query generation for growing query sizes.
//!
//! A query of depth `n` is described by a [`QueryPlan`], an ordered list of `n` levels with the
//! outermost level first. Each [`Dialect`] serialises a plan in its own syntax. For the
//! [`Shape::Nested`] shape every level is a clause nested inside the previous one, opened on the
//! way in and closed on the way out by [`nest`]. For the [`Shape::Flat`] shape the levels are
//! siblings selecting one more field each.
//!
//! Depth 0 renders the bare envelope without any nested clause.
use fs_err as fs;
use log::{debug, info};
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;

mod graphql;
mod sparql;
mod transformer;

/// Query language a plan is rendered in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dialect {
    /// GraphQL as served by HyperGraphQL 1.0.3, root field `ex_Person_GET`.
    Hgql1,
    /// GraphQL as served by HyperGraphQL 2.0.0, root field `ex_Person`.
    Hgql2,
    /// SPARQL 1.1 with one `OPTIONAL` per level.
    Sparql,
    /// JSON query-by-example of SPARQL-Transformer.
    Transformer,
}

/// Whether levels are nested into each other or added side by side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Shape {
    /// Level `k` follows `ex:relatedWith` from level `k - 1`.
    Nested,
    /// Level `k` selects `ex:field_k` of the root person.
    Flat,
}

/// Error for unknown dialect or shape names.
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
#[error("unknown {kind} '{name}', expected one of: {expected}")]
pub struct ParseError {
    kind: &'static str,
    name: String,
    expected: &'static str,
}

impl Dialect {
    /// All dialects in a fixed order.
    pub const ALL: [Dialect; 4] = [Dialect::Hgql1, Dialect::Hgql2, Dialect::Sparql, Dialect::Transformer];

    /// Short name used on the command line.
    pub fn tag(self) -> &'static str {
        match self {
            Dialect::Hgql1 => "hgql1",
            Dialect::Hgql2 => "hgql2",
            Dialect::Sparql => "sparql",
            Dialect::Transformer => "json",
        }
    }

    /// File extension of generated queries.
    pub fn extension(self) -> &'static str {
        match self {
            Dialect::Hgql1 | Dialect::Hgql2 => "graphql",
            Dialect::Sparql => "sparql",
            Dialect::Transformer => "json",
        }
    }

    /// Name of the file holding the query of the given depth.
    pub fn file_name(self, depth: usize) -> String {
        match self {
            Dialect::Hgql1 => format!("query_{depth}_hgql_1.0.3.graphql"),
            Dialect::Hgql2 => format!("query_{depth}_hgql_2.0.0.graphql"),
            Dialect::Sparql | Dialect::Transformer => format!("query_{depth}.{}", self.extension()),
        }
    }

    /// Token that occurs exactly once per level in a rendered query of the given shape.
    pub fn marker(self, shape: Shape) -> &'static str {
        match (self, shape) {
            (Dialect::Hgql1 | Dialect::Hgql2, Shape::Nested) => "ex_relatedWith{",
            (Dialect::Hgql1 | Dialect::Hgql2, Shape::Flat) => "ex_field_",
            (Dialect::Sparql, _) => "OPTIONAL{",
            (Dialect::Transformer, Shape::Nested) => "\"rel_",
            (Dialect::Transformer, Shape::Flat) => "\"field_",
        }
    }

    /// Serialise a plan as query text.
    pub fn render(self, plan: &QueryPlan) -> String {
        match self {
            Dialect::Hgql1 => graphql::render("ex_Person_GET", plan),
            Dialect::Hgql2 => graphql::render("ex_Person", plan),
            Dialect::Sparql => sparql::render(plan),
            Dialect::Transformer => transformer::render(plan),
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for Dialect {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Dialect::ALL.into_iter().find(|d| d.tag() == s).ok_or_else(|| ParseError {
            kind: "dialect",
            name: s.to_owned(),
            expected: "hgql1, hgql2, sparql, json",
        })
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Shape::Nested => "nested",
            Shape::Flat => "flat",
        })
    }
}

impl FromStr for Shape {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "nested" => Ok(Shape::Nested),
            "flat" => Ok(Shape::Flat),
            _ => Err(ParseError { kind: "shape", name: s.to_owned(), expected: "nested, flat" }),
        }
    }
}

/// One level of a plan, numbered from 1 at the outermost level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Level {
    pub index: usize,
}

impl Level {
    /// `2 * (index + offset)` spaces.
    pub fn indent(self, offset: usize) -> String {
        " ".repeat(2 * (self.index + offset))
    }
}

/// Ordered levels of a query, outermost first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryPlan {
    shape: Shape,
    levels: Vec<Level>,
}

impl QueryPlan {
    /// Plan without any level.
    pub fn empty(shape: Shape) -> Self {
        QueryPlan { shape, levels: Vec::new() }
    }

    pub fn new(shape: Shape, depth: usize) -> Self {
        let mut plan = Self::empty(shape);
        for _ in 0..depth {
            plan.deepen();
        }
        plan
    }

    /// Add one level below the current innermost one.
    pub fn deepen(&mut self) {
        let index = self.levels.len() + 1;
        self.levels.push(Level { index });
    }

    pub fn shape(&self) -> Shape {
        self.shape
    }

    pub fn depth(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    pub fn levels(&self) -> &[Level] {
        &self.levels
    }
}

/// Open every level from the outside in, then close them from the inside out.
/// `open` receives whether the level is the innermost one.
pub fn nest(levels: &[Level], open: impl Fn(Level, bool) -> String, close: impl Fn(Level) -> String) -> String {
    let mut out = String::new();
    for (i, level) in levels.iter().enumerate() {
        out.push_str(&open(*level, i + 1 == levels.len()));
    }
    for level in levels.iter().rev() {
        out.push_str(&close(*level));
    }
    out
}

/// Render a single query of the given depth.
pub fn render(dialect: Dialect, shape: Shape, depth: usize) -> String {
    dialect.render(&QueryPlan::new(shape, depth))
}

/// Queries of depth `1..=depth`, shallowest first.
pub fn expand(dialect: Dialect, shape: Shape, depth: usize) -> Vec<String> {
    let mut plan = QueryPlan::empty(shape);
    (1..=depth)
        .map(|_| {
            plan.deepen();
            dialect.render(&plan)
        })
        .collect()
}

/// Write the queries of depth `1..=depth` into `dir`, one file each, and return their paths.
/// Depth 0 writes the bare envelope as the single query of depth 0.
/// Existing files are overwritten.
pub fn write_queries(dir: &Path, dialect: Dialect, shape: Shape, depth: usize) -> io::Result<Vec<PathBuf>> {
    fs::create_dir_all(dir)?;
    let queries: Vec<(usize, String)> = if depth == 0 {
        vec![(0, render(dialect, shape, 0))]
    } else {
        (1..).zip(expand(dialect, shape, depth)).collect()
    };
    let mut paths = Vec::with_capacity(queries.len());
    for (d, query) in queries {
        let path = dir.join(dialect.file_name(d));
        debug!("writing {}", path.display());
        fs::write(&path, query)?;
        paths.push(path);
    }
    info!("wrote {} {shape} {dialect} queries to {}", paths.len(), dir.display());
    Ok(paths)
}
