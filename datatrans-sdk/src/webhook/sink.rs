//! Byte sinks fed while a webhook body is drained.

use bytes::BytesMut;

use crate::signature::SignatureAccumulator;

/// Something that consumes body chunks in order.
pub trait ByteSink {
    fn write(&mut self, chunk: &[u8]);
}

impl ByteSink for BytesMut {
    fn write(&mut self, chunk: &[u8]) {
        self.extend_from_slice(chunk);
    }
}

impl ByteSink for SignatureAccumulator {
    fn write(&mut self, chunk: &[u8]) {
        self.update(chunk);
    }
}

/// Writes every chunk to both inner sinks.
#[derive(Debug)]
pub struct FanOut<A, B>(pub A, pub B);

impl<A: ByteSink, B: ByteSink> ByteSink for FanOut<A, B> {
    fn write(&mut self, chunk: &[u8]) {
        self.0.write(chunk);
        self.1.write(chunk);
    }
}
