/// Circular buffer of rectified input samples.
///
/// Magnitudes are held as `i32` so that `|i16::MIN|` is represented exactly.
/// The length is fixed at construction and equals the template's tap count.
#[derive(Debug, Clone)]
pub struct History {
    pub(super) samples: Vec<i32>,
    pub(super) write_index: usize,
}

impl History {
    pub fn new(len: usize) -> Self {
        Self {
            samples: vec![0; len],
            write_index: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Slot the next sample will be written to
    pub fn write_index(&self) -> usize {
        self.write_index
    }

    /// Raw slot contents, in storage order rather than age order
    pub fn samples(&self) -> &[i32] {
        &self.samples
    }

    /// Zero every slot and rewind the cursor without reallocating.
    pub fn reset(&mut self) {
        self.samples.fill(0);
        self.write_index = 0;
    }
}
