//! Hand-over of query internals to an external visualization consumer.
//!
//! When a query asks for visualization, the engine passes the beacons, the
//! optional ground-truth position, the raw candidate points and the resulting
//! centroid to an [`IntersectionSink`]. The hand-over is one-way: sinks
//! cannot fail the query, and they handle their own errors.

use crate::{Beacon, Centroid, Point};
use parking_lot::Mutex;

/// Everything a query produced, borrowed for the duration of `emit`.
#[derive(Debug, Clone, Copy)]
pub struct IntersectionFrame<'a> {
    /// Caller-chosen label for the output artifact
    pub tag: &'a str,
    /// Query beacons in configured order
    pub beacons: &'a [Beacon],
    /// Known true position, if the caller has one
    pub actual: Option<Point>,
    /// Grid points consistent with every beacon
    pub candidates: &'a [Point],
    /// The value `multilaterate` returned for this query
    pub centroid: Option<Centroid>,
}

/// Consumer of intersection frames.
pub trait IntersectionSink: Send + Sync {
    fn emit(&self, frame: &IntersectionFrame<'_>);
}

/// Logs a one-line summary of every frame at info level.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl IntersectionSink for LogSink {
    fn emit(&self, frame: &IntersectionFrame<'_>) {
        match frame.centroid {
            Some(c) => log::info!(
                "[{}] {} beacons, {} candidates, centroid ({:.6}, {:.6}) err {:.1}m",
                frame.tag,
                frame.beacons.len(),
                frame.candidates.len(),
                c.point.lat,
                c.point.lon,
                c.err
            ),
            None => log::info!(
                "[{}] {} beacons, {} candidates, no solution",
                frame.tag,
                frame.beacons.len(),
                frame.candidates.len()
            ),
        }
    }
}

/// An owned copy of an [`IntersectionFrame`].
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedFrame {
    pub tag: String,
    pub beacons: Vec<Beacon>,
    pub actual: Option<Point>,
    pub candidates: Vec<Point>,
    pub centroid: Option<Centroid>,
}

impl From<&IntersectionFrame<'_>> for RecordedFrame {
    fn from(frame: &IntersectionFrame<'_>) -> Self {
        Self {
            tag: frame.tag.to_string(),
            beacons: frame.beacons.to_vec(),
            actual: frame.actual,
            candidates: frame.candidates.to_vec(),
            centroid: frame.centroid,
        }
    }
}

/// Keeps every frame in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    frames: Mutex<Vec<RecordedFrame>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copies of the frames received so far.
    pub fn frames(&self) -> Vec<RecordedFrame> {
        self.frames.lock().clone()
    }

    /// Remove and return the frames received so far.
    pub fn take(&self) -> Vec<RecordedFrame> {
        std::mem::take(&mut *self.frames.lock())
    }

    pub fn len(&self) -> usize {
        self.frames.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl IntersectionSink for MemorySink {
    fn emit(&self, frame: &IntersectionFrame<'_>) {
        self.frames.lock().push(frame.into());
    }
}

#[cfg(feature = "geojson")]
pub use self::geojson_sink::{GeoJsonSink, frame_to_geojson};

#[cfg(feature = "geojson")]
mod geojson_sink {
    use super::{IntersectionFrame, IntersectionSink};
    use crate::Point;
    use geojson::{Feature, FeatureCollection, Geometry, JsonObject, Value};
    use serde_json::json;
    use std::path::{Path, PathBuf};

    fn position(p: &Point) -> Vec<f64> {
        vec![p.lon, p.lat]
    }

    fn feature(value: Value, properties: serde_json::Value) -> Feature {
        let properties: Option<JsonObject> = match properties {
            serde_json::Value::Object(map) => Some(map),
            _ => None,
        };
        Feature {
            bbox: None,
            geometry: Some(Geometry::new(value)),
            id: None,
            properties,
            foreign_members: None,
        }
    }

    /// Convert a frame to a GeoJSON feature collection.
    ///
    /// Features carry a `kind` property: `beacon` (with `low`/`high` range in
    /// meters), `candidates` (a multipoint), `centroid` (with `error` in
    /// meters) and `actual`.
    pub fn frame_to_geojson(frame: &IntersectionFrame<'_>) -> FeatureCollection {
        let mut features = Vec::with_capacity(frame.beacons.len() + 3);

        for (index, beacon) in frame.beacons.iter().enumerate() {
            features.push(feature(
                Value::Point(position(&beacon.point)),
                json!({
                    "kind": "beacon",
                    "index": index,
                    "low": beacon.range.low,
                    "high": beacon.range.high,
                }),
            ));
        }

        features.push(feature(
            Value::MultiPoint(frame.candidates.iter().map(position).collect()),
            json!({ "kind": "candidates", "count": frame.candidates.len() }),
        ));

        if let Some(c) = frame.centroid {
            features.push(feature(
                Value::Point(position(&c.point)),
                json!({ "kind": "centroid", "error": c.err }),
            ));
        }

        if let Some(actual) = frame.actual {
            features.push(feature(
                Value::Point(position(&actual)),
                json!({ "kind": "actual" }),
            ));
        }

        FeatureCollection {
            bbox: None,
            features,
            foreign_members: Some(
                [("tag".to_string(), json!(frame.tag))]
                    .into_iter()
                    .collect(),
            ),
        }
    }

    /// Writes each frame to `<dir>/map-<tag>.geojson`.
    ///
    /// Write failures are logged and otherwise ignored.
    #[derive(Debug, Clone)]
    pub struct GeoJsonSink {
        dir: PathBuf,
    }

    impl GeoJsonSink {
        pub fn new<P: Into<PathBuf>>(dir: P) -> Self {
            Self { dir: dir.into() }
        }

        pub fn dir(&self) -> &Path {
            &self.dir
        }

        /// File a frame with this tag is written to.
        pub fn path_for(&self, tag: &str) -> PathBuf {
            let name: String = tag
                .chars()
                .map(|c| {
                    if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                        c
                    } else {
                        '_'
                    }
                })
                .collect();
            self.dir.join(format!("map-{}.geojson", name))
        }
    }

    impl IntersectionSink for GeoJsonSink {
        fn emit(&self, frame: &IntersectionFrame<'_>) {
            let path = self.path_for(frame.tag);
            let body = match serde_json::to_string_pretty(&frame_to_geojson(frame)) {
                Ok(body) => body,
                Err(e) => {
                    log::error!("failed to serialize frame {}: {}", frame.tag, e);
                    return;
                }
            };

            match std::fs::write(&path, body) {
                Ok(()) => log::debug!("wrote {}", path.display()),
                Err(e) => log::error!("failed to write {}: {}", path.display(), e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Bucket;

    fn frame_parts() -> (Vec<Beacon>, Vec<Point>) {
        let beacons = vec![
            Beacon::new(Point::new(45.0, 45.0), Bucket::new(0.0, 500.0)),
            Beacon::new(Point::new(45.01, 45.0), Bucket::new(500.0, 1000.0)),
        ];
        let candidates = vec![Point::new(45.004, 45.0), Point::new(45.005, 45.001)];
        (beacons, candidates)
    }

    #[test]
    fn test_memory_sink_records_frames() {
        let (beacons, candidates) = frame_parts();
        let sink = MemorySink::new();
        let frame = IntersectionFrame {
            tag: "probe",
            beacons: &beacons,
            actual: Some(Point::new(45.0045, 45.0)),
            candidates: &candidates,
            centroid: None,
        };
        sink.emit(&frame);

        let frames = sink.frames();
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].tag, "probe");
        assert_eq!(frames[0].candidates, candidates);
        assert_eq!(sink.take().len(), 1);
        assert!(sink.is_empty());
    }

    #[test]
    fn test_log_sink_does_not_panic() {
        let (beacons, candidates) = frame_parts();
        LogSink.emit(&IntersectionFrame {
            tag: "log",
            beacons: &beacons,
            actual: None,
            candidates: &candidates,
            centroid: Some(Centroid::new(Point::new(45.0045, 45.0005), 60.0)),
        });
    }

    #[cfg(feature = "geojson")]
    #[test]
    fn test_geojson_feature_collection() {
        let (beacons, candidates) = frame_parts();
        let frame = IntersectionFrame {
            tag: "geo",
            beacons: &beacons,
            actual: Some(Point::new(45.0045, 45.0)),
            candidates: &candidates,
            centroid: Some(Centroid::new(Point::new(45.0045, 45.0005), 60.0)),
        };
        let fc = frame_to_geojson(&frame);
        // 2 beacons + candidates + centroid + actual
        assert_eq!(fc.features.len(), 5);

        let kinds: Vec<String> = fc
            .features
            .iter()
            .map(|f| f.property("kind").unwrap().as_str().unwrap().to_string())
            .collect();
        assert_eq!(kinds, ["beacon", "beacon", "candidates", "centroid", "actual"]);

        match &fc.features[0].geometry.as_ref().unwrap().value {
            geojson::Value::Point(coords) => assert_eq!(coords, &vec![45.0, 45.0]),
            other => panic!("unexpected geometry {:?}", other),
        }
    }

    #[cfg(feature = "geojson")]
    #[test]
    fn test_geojson_sink_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let sink = GeoJsonSink::new(dir.path());
        let (beacons, candidates) = frame_parts();
        sink.emit(&IntersectionFrame {
            tag: "run 1/a",
            beacons: &beacons,
            actual: None,
            candidates: &candidates,
            centroid: None,
        });

        let path = sink.path_for("run 1/a");
        assert_eq!(path.file_name().unwrap(), "map-run_1_a.geojson");
        let body = std::fs::read_to_string(path).unwrap();
        let parsed: geojson::FeatureCollection = serde_json::from_str(&body).unwrap();
        assert_eq!(parsed.features.len(), 3);
    }
}
