// Geographic reference seam used by the map transformers
use super::chart::Coordinates;

/// Read-only lookup over static geographic tables
pub trait GeoReference: Send + Sync {
    /// Canonical full state name for an abbreviation or a name in any case.
    /// Returns None for blank input.
    fn canonical_state(&self, raw: &str) -> Option<String>;

    /// Marker position for a canonical state name, if known
    fn coordinates(&self, state: &str) -> Option<Coordinates>;
}
