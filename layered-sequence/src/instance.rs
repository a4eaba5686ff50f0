//! Training instances and where they go.

use std::io::Write;

use layered_features::Feature;
use serde::{Deserialize, Serialize};

use crate::error::SinkError;
use crate::label::Label;

/// Features of one position (or node pair), with the gold label when known.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instance {
    pub features: Vec<Feature>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<Label>,
}

impl Instance {
    pub fn new(features: Vec<Feature>) -> Self {
        Self {
            features,
            label: None,
        }
    }

    pub fn labeled(features: Vec<Feature>, label: impl Into<Label>) -> Self {
        Self {
            features,
            label: Some(label.into()),
        }
    }
}

/// Receives training instances.
pub trait InstanceSink {
    fn write(&mut self, instance: Instance) -> Result<(), SinkError>;
}

impl<S: InstanceSink + ?Sized> InstanceSink for &mut S {
    fn write(&mut self, instance: Instance) -> Result<(), SinkError> {
        (**self).write(instance)
    }
}

impl<S: InstanceSink + ?Sized> InstanceSink for Box<S> {
    fn write(&mut self, instance: Instance) -> Result<(), SinkError> {
        (**self).write(instance)
    }
}

/// Keeps instances in memory.
#[derive(Debug, Clone, Default)]
pub struct VecSink {
    instances: Vec<Instance>,
}

impl VecSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn instances(&self) -> &[Instance] {
        &self.instances
    }

    pub fn into_inner(self) -> Vec<Instance> {
        self.instances
    }
}

impl InstanceSink for VecSink {
    fn write(&mut self, instance: Instance) -> Result<(), SinkError> {
        self.instances.push(instance);
        Ok(())
    }
}

/// Writes one JSON object per line.
#[derive(Debug)]
pub struct JsonLinesSink<W> {
    writer: W,
    written: usize,
}

impl<W: Write> JsonLinesSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, written: 0 }
    }

    /// Number of instances written so far.
    pub fn written(&self) -> usize {
        self.written
    }

    pub fn flush(&mut self) -> Result<(), SinkError> {
        self.writer.flush()?;
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> InstanceSink for JsonLinesSink<W> {
    fn write(&mut self, instance: Instance) -> Result<(), SinkError> {
        serde_json::to_writer(&mut self.writer, &instance)?;
        self.writer.write_all(b"\n")?;
        self.written += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_lines_layout() {
        let mut sink = JsonLinesSink::new(Vec::new());
        sink.write(Instance::labeled(
            vec![
                Feature::unnamed("the"),
                Feature::new("PreviousOutcome_L1", "<START>"),
            ],
            "DT",
        ))
        .unwrap();
        sink.write(Instance::new(vec![Feature::new("RelativePosition", "LEFTOF")]))
            .unwrap();
        assert_eq!(sink.written(), 2);

        let out = String::from_utf8(sink.into_inner()).unwrap();
        insta::assert_snapshot!(out.trim_end(), @r###"
        {"features":[{"value":{"Text":"the"}},{"name":"PreviousOutcome_L1","value":{"Text":"<START>"}}],"label":"DT"}
        {"features":[{"name":"RelativePosition","value":{"Text":"LEFTOF"}}]}
        "###);
    }

    #[test]
    fn json_lines_read_back() {
        let instance = Instance::labeled(vec![Feature::unnamed("dog")], 7i64);
        let mut sink = JsonLinesSink::new(Vec::new());
        sink.write(instance.clone()).unwrap();

        let out = sink.into_inner();
        let line = std::str::from_utf8(&out).unwrap().trim_end();
        let parsed: Instance = serde_json::from_str(line).unwrap();
        assert_eq!(parsed, instance);
    }
}
