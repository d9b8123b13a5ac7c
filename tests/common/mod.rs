/// Test utilities for building sensor readout documents
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Builder for creating sensor readout test documents
pub struct ReadoutBuilder {
    text: String,
}

impl ReadoutBuilder {
    /// Create an empty document
    pub fn new() -> Self {
        Self {
            text: String::new(),
        }
    }

    /// Add a `[fingerprint:point]` header with `name` and extra `key=value` lines
    pub fn point_header(self, name: &str, params: &[(&str, &str)]) -> Self {
        self.header("[fingerprint:point]", name, params)
    }

    /// Add a `[fingerprint:path]` header with `name` and extra `key=value` lines
    pub fn path_header(self, name: &str, params: &[(&str, &str)]) -> Self {
        self.header("[fingerprint:path]", name, params)
    }

    fn header(mut self, tag: &str, name: &str, params: &[(&str, &str)]) -> Self {
        self.text.push_str(tag);
        self.text.push('\n');
        self.text.push_str(&format!("name={}\n", name));
        for (key, value) in params {
            self.text.push_str(&format!("{}={}\n", key, value));
        }
        self.text.push('\n');
        self
    }

    /// Add a data line `timestamp;discriminant;fields...`
    pub fn event(mut self, timestamp: u64, discriminant: i64, fields: &[&str]) -> Self {
        self.text.push_str(&format!("{};{}", timestamp, discriminant));
        for field in fields {
            self.text.push(';');
            self.text.push_str(field);
        }
        self.text.push('\n');
        self
    }

    /// Add an accelerometer line
    pub fn accel(self, timestamp: u64, x: f64, y: f64, z: f64) -> Self {
        self.event(
            timestamp,
            0,
            &[&x.to_string(), &y.to_string(), &z.to_string()],
        )
    }

    /// Add a Wi-Fi line
    pub fn wifi(self, timestamp: u64, mac: &str, freq: i64, rssi: i64) -> Self {
        self.event(timestamp, 8, &[mac, &freq.to_string(), &rssi.to_string()])
    }

    /// Add a UWB line with node triples `(node_id, distance_mm, quality)`
    pub fn uwb(self, timestamp: u64, pos: (f64, f64, f64), quality: i8, nodes: &[(i16, i64, i8)]) -> Self {
        let mut fields = vec![
            pos.0.to_string(),
            pos.1.to_string(),
            pos.2.to_string(),
            quality.to_string(),
        ];
        for (node, dist, q) in nodes {
            fields.push(node.to_string());
            fields.push(dist.to_string());
            fields.push(q.to_string());
        }
        let refs: Vec<&str> = fields.iter().map(String::as_str).collect();
        self.event(timestamp, 20, &refs)
    }

    /// Add a file metadata line
    pub fn file_metadata(self, timestamp: u64, date: &str, person: &str, comment: &str) -> Self {
        self.event(timestamp, -2, &[date, person, comment])
    }

    /// Add a ground truth line
    pub fn ground_truth(self, timestamp: u64, id: i64) -> Self {
        self.event(timestamp, 99, &[&id.to_string()])
    }

    /// Add raw text verbatim
    pub fn raw(mut self, text: &str) -> Self {
        self.text.push_str(text);
        self
    }

    /// Terminate the current section with a blank line
    pub fn end_section(mut self) -> Self {
        self.text.push('\n');
        self
    }

    /// Build and return the document text
    pub fn build(self) -> String {
        self.text
    }

    /// Write the document into `dir` and return its path
    pub fn write_to(self, dir: &Path, file_name: &str) -> PathBuf {
        let path = dir.join(file_name);
        File::create(&path)
            .unwrap()
            .write_all(self.text.as_bytes())
            .unwrap();
        path
    }
}

impl Default for ReadoutBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_event_line() {
        let text = ReadoutBuilder::new().event(100, 13, &["42.5"]).build();
        assert_eq!(text, "100;13;42.5\n");
    }

    #[test]
    fn test_builder_header() {
        let text = ReadoutBuilder::new()
            .point_header("A", &[("position", "(1;2;3)")])
            .build();
        assert_eq!(text, "[fingerprint:point]\nname=A\nposition=(1;2;3)\n\n");
    }

    #[test]
    fn test_builder_uwb_line() {
        let text = ReadoutBuilder::new()
            .uwb(5, (1.0, 2.0, 3.0), 90, &[(7, 1200, 80)])
            .build();
        assert_eq!(text, "5;20;1;2;3;90;7;1200;80\n");
    }
}
