//! Table extraction: page geometry → raw grids.
//!
//! Tables are found from ruling lines only (the "lattice" strategy): edges are
//! snapped and joined, their intersections become candidate corners, the
//! smallest closed rectangles between connected corners become cells, and
//! cells that share corners are grouped into tables. Text is then assigned to
//! cells by glyph centre.
//!
//! This pass runs on its own document handle, opened lazily by
//! [`TableExtractor`] the first time a page asks for tables. Everything that
//! can go wrong here (re-open failure, a page whose geometry cannot be read)
//! turns into "no tables" for that page. Missing a table is acceptable;
//! aborting a conversion over one is not.

use crate::pipeline::source::{DocumentBackend, Edge, GeometrySource, Glyph, Orientation, PageGeometry};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use tracing::debug;

/// A raw table: rows of cells, each cell text-or-absent.
///
/// Row 0 is the header row by position alone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid {
    pub rows: Vec<Vec<Option<String>>>,
}

impl Grid {
    pub fn new(rows: Vec<Vec<Option<String>>>) -> Self {
        Self { rows }
    }

    /// Build a grid where every cell is present.
    pub fn from_strings<R, C>(rows: R) -> Self
    where
        R: IntoIterator<Item = C>,
        C: IntoIterator,
        C::Item: Into<String>,
    {
        Self {
            rows: rows
                .into_iter()
                .map(|row| row.into_iter().map(|c| Some(c.into())).collect())
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}

/// Tolerances for lattice detection, in points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableSettings {
    /// Parallel edges closer than this are snapped to a common position.
    pub snap_tolerance: f32,
    /// Collinear edges separated by at most this gap are joined.
    pub join_tolerance: f32,
    /// Edges shorter than this are ignored.
    pub edge_min_length: f32,
    /// How far an edge may stop short of another and still intersect it.
    pub intersection_tolerance: f32,
}

impl Default for TableSettings {
    fn default() -> Self {
        Self {
            snap_tolerance: 3.0,
            join_tolerance: 3.0,
            edge_min_length: 3.0,
            intersection_tolerance: 3.0,
        }
    }
}

// ── Best-effort extractor ────────────────────────────────────────────────────

/// Per-conversion table pass with its own, lazily opened document handle.
pub struct TableExtractor<'a> {
    backend: &'a dyn DocumentBackend,
    path: PathBuf,
    password: Option<&'a str>,
    settings: TableSettings,
    handle: Handle<'a>,
}

enum Handle<'a> {
    Unopened,
    Open(Box<dyn GeometrySource + 'a>),
    Unavailable,
}

impl<'a> TableExtractor<'a> {
    pub fn new(
        backend: &'a dyn DocumentBackend,
        path: &Path,
        password: Option<&'a str>,
        settings: TableSettings,
    ) -> Self {
        Self {
            backend,
            path: path.to_path_buf(),
            password,
            settings,
            handle: Handle::Unopened,
        }
    }

    /// Tables on page `index` (0-based), or `None` when there are none.
    ///
    /// `None` covers every failure mode as well: out-of-range page, geometry
    /// engine error, or a document that could not be re-opened.
    pub fn extract(&mut self, index: usize) -> Option<Vec<Grid>> {
        let source = self.source()?;
        if index >= source.page_count() {
            return None;
        }
        let geometry = match source.page_geometry(index) {
            Ok(g) => g,
            Err(e) => {
                debug!("Table geometry unavailable for page {}: {}", index + 1, e);
                return None;
            }
        };
        let grids = find_tables(&geometry, &self.settings);
        if grids.is_empty() {
            None
        } else {
            debug!("Page {}: {} table(s) detected", index + 1, grids.len());
            Some(grids)
        }
    }

    fn source(&mut self) -> Option<&dyn GeometrySource> {
        if let Handle::Unopened = self.handle {
            self.handle = match self
                .backend
                .open_geometry(&self.path, self.password)
            {
                Ok(source) => Handle::Open(source),
                Err(e) => {
                    debug!(
                        "Geometry pass unavailable for '{}': {}",
                        self.path.display(),
                        e
                    );
                    Handle::Unavailable
                }
            };
        }
        match &self.handle {
            Handle::Open(source) => Some(source.as_ref()),
            _ => None,
        }
    }
}

// ── Lattice detection ────────────────────────────────────────────────────────

/// Detect bordered tables on one page.
///
/// Tables are returned top to bottom, then left to right.
pub fn find_tables(geometry: &PageGeometry, settings: &TableSettings) -> Vec<Grid> {
    let edges = merge_edges(&geometry.edges, settings);
    if edges.is_empty() {
        return Vec::new();
    }
    let junctions = find_junctions(&edges, settings.intersection_tolerance);
    let cells = find_cells(&junctions);
    let mut tables = group_cells(&cells);
    tables.sort_by(|a, b| {
        let (at, al) = table_origin(a);
        let (bt, bl) = table_origin(b);
        at.total_cmp(&bt).then(al.total_cmp(&bl))
    });
    tables
        .iter()
        .map(|cells| build_grid(cells, &geometry.glyphs))
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct CellBox {
    x0: f32,
    top: f32,
    x1: f32,
    bottom: f32,
}

impl CellBox {
    fn corners(&self) -> [PointKey; 4] {
        [
            PointKey::new(self.x0, self.top),
            PointKey::new(self.x1, self.top),
            PointKey::new(self.x0, self.bottom),
            PointKey::new(self.x1, self.bottom),
        ]
    }

    fn contains(&self, (x, y): (f32, f32)) -> bool {
        x >= self.x0 && x < self.x1 && y >= self.top && y < self.bottom
    }
}

/// Exact point identity after snapping, ordered by x then y.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
struct PointKey(i64, i64);

impl PointKey {
    fn new(x: f32, y: f32) -> Self {
        PointKey(quantise(x), quantise(y))
    }
}

fn quantise(v: f32) -> i64 {
    (f64::from(v) * 1000.0).round() as i64
}

#[derive(Debug, Default)]
struct Junction {
    x: f32,
    y: f32,
    horizontal: Vec<usize>,
    vertical: Vec<usize>,
}

/// Snap, join and length-filter the raw edges.
fn merge_edges(edges: &[Edge], settings: &TableSettings) -> Vec<Edge> {
    let (mut horizontal, mut vertical): (Vec<Edge>, Vec<Edge>) = edges
        .iter()
        .copied()
        .partition(|e| e.orientation == Orientation::Horizontal);

    snap(&mut horizontal, settings.snap_tolerance, |e| e.top, |e, v| {
        e.top = v;
        e.bottom = v;
    });
    snap(&mut vertical, settings.snap_tolerance, |e| e.x0, |e, v| {
        e.x0 = v;
        e.x1 = v;
    });

    let mut merged = join(horizontal, settings.join_tolerance);
    merged.extend(join(vertical, settings.join_tolerance));
    merged.retain(|e| e.length() >= settings.edge_min_length);
    merged
}

/// Cluster edges by their fixed coordinate and move each cluster to its mean.
fn snap(
    edges: &mut [Edge],
    tolerance: f32,
    position: impl Fn(&Edge) -> f32,
    set: impl Fn(&mut Edge, f32),
) {
    edges.sort_by(|a, b| position(a).total_cmp(&position(b)));
    let mut start = 0;
    while start < edges.len() {
        let mut end = start + 1;
        while end < edges.len() && position(&edges[end]) - position(&edges[end - 1]) <= tolerance
        {
            end += 1;
        }
        let cluster = &mut edges[start..end];
        let mean = cluster.iter().map(&position).sum::<f32>() / cluster.len() as f32;
        for e in cluster.iter_mut() {
            set(e, mean);
        }
        start = end;
    }
}

/// Join collinear edges that overlap or nearly touch.
fn join(mut edges: Vec<Edge>, tolerance: f32) -> Vec<Edge> {
    let key = |e: &Edge| match e.orientation {
        Orientation::Horizontal => (quantise(e.top), e.x0, e.x1),
        Orientation::Vertical => (quantise(e.x0), e.top, e.bottom),
    };
    edges.sort_by(|a, b| {
        let (la, sa, _) = key(a);
        let (lb, sb, _) = key(b);
        la.cmp(&lb).then(sa.total_cmp(&sb))
    });

    let mut out: Vec<Edge> = Vec::with_capacity(edges.len());
    for edge in edges {
        if let Some(last) = out.last_mut() {
            let (line_last, _, end_last) = key(&*last);
            let (line, start, end) = key(&edge);
            if line_last == line && start <= end_last + tolerance {
                match last.orientation {
                    Orientation::Horizontal => last.x1 = last.x1.max(end),
                    Orientation::Vertical => last.bottom = last.bottom.max(end),
                }
                continue;
            }
        }
        out.push(edge);
    }
    out
}

fn find_junctions(edges: &[Edge], tolerance: f32) -> BTreeMap<PointKey, Junction> {
    let mut junctions: BTreeMap<PointKey, Junction> = BTreeMap::new();
    for (vi, v) in edges.iter().enumerate() {
        if v.orientation != Orientation::Vertical {
            continue;
        }
        for (hi, h) in edges.iter().enumerate() {
            if h.orientation != Orientation::Horizontal {
                continue;
            }
            let crosses = v.top <= h.top + tolerance
                && v.bottom >= h.top - tolerance
                && v.x0 >= h.x0 - tolerance
                && v.x0 <= h.x1 + tolerance;
            if !crosses {
                continue;
            }
            let j = junctions
                .entry(PointKey::new(v.x0, h.top))
                .or_insert_with(|| Junction {
                    x: v.x0,
                    y: h.top,
                    ..Junction::default()
                });
            j.horizontal.push(hi);
            j.vertical.push(vi);
        }
    }
    junctions
}

fn share_edge(a: &[usize], b: &[usize]) -> bool {
    a.iter().any(|e| b.contains(e))
}

/// Smallest closed cell anchored at each junction's top-left.
fn find_cells(junctions: &BTreeMap<PointKey, Junction>) -> Vec<CellBox> {
    let points: Vec<(&PointKey, &Junction)> = junctions.iter().collect();
    let mut cells = Vec::new();

    for (i, (key, pt)) in points.iter().enumerate() {
        let rest = &points[i + 1..];
        let below = rest.iter().filter(|(k, _)| k.0 == key.0 && k.1 > key.1);
        let right: Vec<_> = rest
            .iter()
            .filter(|(k, _)| k.1 == key.1 && k.0 > key.0)
            .collect();

        'search: for (bkey, b) in below {
            if !share_edge(&pt.vertical, &b.vertical) {
                continue;
            }
            for (rkey, r) in &right {
                if !share_edge(&pt.horizontal, &r.horizontal) {
                    continue;
                }
                let corner = PointKey(rkey.0, bkey.1);
                if let Some(c) = junctions.get(&corner) {
                    if share_edge(&c.vertical, &r.vertical) && share_edge(&c.horizontal, &b.horizontal)
                    {
                        cells.push(CellBox {
                            x0: pt.x,
                            top: pt.y,
                            x1: r.x,
                            bottom: b.y,
                        });
                        break 'search;
                    }
                }
            }
        }
    }
    cells
}

/// Group cells sharing at least one corner; single-cell groups are dropped.
fn group_cells(cells: &[CellBox]) -> Vec<Vec<CellBox>> {
    let mut parent: Vec<usize> = (0..cells.len()).collect();

    fn root(parent: &mut [usize], mut i: usize) -> usize {
        while parent[i] != i {
            parent[i] = parent[parent[i]];
            i = parent[i];
        }
        i
    }

    let mut by_corner: HashMap<PointKey, usize> = HashMap::new();
    for (i, cell) in cells.iter().enumerate() {
        for corner in cell.corners() {
            match by_corner.get(&corner) {
                Some(&other) => {
                    let (a, b) = (root(&mut parent, i), root(&mut parent, other));
                    if a != b {
                        parent[a] = b;
                    }
                }
                None => {
                    by_corner.insert(corner, i);
                }
            }
        }
    }

    let mut groups: BTreeMap<usize, Vec<CellBox>> = BTreeMap::new();
    for (i, cell) in cells.iter().enumerate() {
        let r = root(&mut parent, i);
        groups.entry(r).or_default().push(*cell);
    }
    groups.into_values().filter(|g| g.len() > 1).collect()
}

fn table_origin(cells: &[CellBox]) -> (f32, f32) {
    let top = cells.iter().map(|c| c.top).fold(f32::INFINITY, f32::min);
    let left = cells.iter().map(|c| c.x0).fold(f32::INFINITY, f32::min);
    (top, left)
}

fn distinct_sorted(values: impl Iterator<Item = f32>) -> Vec<f32> {
    let mut v: Vec<f32> = values.collect();
    v.sort_by(f32::total_cmp);
    v.dedup_by(|a, b| quantise(*a) == quantise(*b));
    v
}

fn build_grid(cells: &[CellBox], glyphs: &[Glyph]) -> Grid {
    let tops = distinct_sorted(cells.iter().map(|c| c.top));
    let lefts = distinct_sorted(cells.iter().map(|c| c.x0));

    let rows = tops
        .iter()
        .map(|&top| {
            lefts
                .iter()
                .map(|&left| {
                    cells
                        .iter()
                        .find(|c| quantise(c.top) == quantise(top) && quantise(c.x0) == quantise(left))
                        .map(|c| cell_text(c, glyphs))
                })
                .collect()
        })
        .collect();
    Grid::new(rows)
}

/// Text of the glyphs centred inside `cell`, one output line per baseline.
fn cell_text(cell: &CellBox, glyphs: &[Glyph]) -> String {
    let mut inside: Vec<&Glyph> = glyphs.iter().filter(|g| cell.contains(g.center())).collect();
    if inside.is_empty() {
        return String::new();
    }
    inside.sort_by(|a, b| a.top.total_cmp(&b.top));

    let mut lines: Vec<Vec<&Glyph>> = Vec::new();
    for glyph in inside {
        let tolerance = ((glyph.bottom - glyph.top) / 2.0).max(1.0);
        let same_line = lines
            .last()
            .is_some_and(|line| (glyph.top - line[0].top).abs() <= tolerance);
        match lines.last_mut() {
            Some(line) if same_line => line.push(glyph),
            _ => lines.push(vec![glyph]),
        }
    }

    lines
        .into_iter()
        .map(|mut line| {
            line.sort_by(|a, b| a.x0.total_cmp(&b.x0));
            let mut text = String::new();
            let mut last_x1: Option<f32> = None;
            for g in line {
                if let Some(x1) = last_x1 {
                    let gap_limit = (g.bottom - g.top) * 0.3;
                    let needs_space = g.x0 - x1 > gap_limit
                        && !text.ends_with(char::is_whitespace)
                        && !g.text.is_whitespace();
                    if needs_space {
                        text.push(' ');
                    }
                }
                text.push(g.text);
                last_x1 = Some(g.x1);
            }
            text.trim().to_string()
        })
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
