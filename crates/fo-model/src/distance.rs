//! Zone-to-zone distance table.

use ndarray::Array2;

use fo_input::ZoneTable;

/// Distance assigned to a trip that starts and ends in the same zone, km.
///
/// A zone-internal trip still covers ground; a floor of 1 km also keeps
/// inverse-distance weights finite.
pub const INTRA_ZONE_DISTANCE_KM: f64 = 1.0;

/// Great-circle distance between every pair of zone centroids, in km.
///
/// The result is square (`number_zones × number_zones`), exactly symmetric
/// (each pair is computed once and mirrored), has `INTRA_ZONE_DISTANCE_KM` on
/// the diagonal, and is strictly positive off the diagonal: coincident
/// centroids of distinct zones also get the intra-zone floor.
pub fn compute_od_distances(zones: &ZoneTable) -> Array2<f64> {
    let n = zones.len();
    let centroids = zones.centroids();
    let mut dist = Array2::from_elem((n, n), INTRA_ZONE_DISTANCE_KM);

    for a in 0..n {
        for b in (a + 1)..n {
            let d = centroids[a].distance_km(centroids[b]);
            let d = if d > 0.0 { d } else { INTRA_ZONE_DISTANCE_KM };
            dist[[a, b]] = d;
            dist[[b, a]] = d;
        }
    }
    dist
}
