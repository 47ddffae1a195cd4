use crate::foundation::{
    core::Point,
    error::{GazemapError, GazemapResult},
};

#[derive(serde::Deserialize)]
struct UploadPayload {
    #[serde(default)]
    points: Vec<Vec<f64>>,
}

/// Decode an upload body of the form `{"points": [[x, y], ...]}`.
///
/// A missing `points` field is an empty upload. Pairs with the wrong arity or
/// non-finite coordinates are rejected with [`GazemapError::Parse`].
pub fn parse_points_json(bytes: &[u8]) -> GazemapResult<Vec<Point>> {
    let payload: UploadPayload =
        serde_json::from_slice(bytes).map_err(|e| GazemapError::parse(e.to_string()))?;

    payload
        .points
        .into_iter()
        .enumerate()
        .map(|(idx, pair)| match pair.as_slice() {
            [x, y] if x.is_finite() && y.is_finite() => Ok(Point::new(*x, *y)),
            [_, _] => Err(GazemapError::parse(format!(
                "points[{idx}] has a non-finite coordinate"
            ))),
            other => Err(GazemapError::parse(format!(
                "points[{idx}] must be an [x, y] pair, got {} values",
                other.len()
            ))),
        })
        .collect()
}

#[cfg(test)]
#[path = "../../tests/unit/points/payload.rs"]
mod tests;
