use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use std::thread::JoinHandle;

use crossbeam_channel::Receiver;
use hound::WavReader;

use crate::error::{FirError, Result};

/// Something that delivers blocks of 16-bit samples.
pub trait SampleSource: Send {
    /// Next block, or `None` at end of stream
    fn next_buffer(&mut self) -> Result<Option<Vec<i16>>>;
    fn sample_rate(&self) -> u32;
}

impl<S: SampleSource + ?Sized> SampleSource for Box<S> {
    fn next_buffer(&mut self) -> Result<Option<Vec<i16>>> {
        (**self).next_buffer()
    }

    fn sample_rate(&self) -> u32 {
        (**self).sample_rate()
    }
}

/// Fixed-size blocks carved out of an in-memory signal.
pub struct MemorySource {
    samples: Vec<i16>,
    position: usize,
    chunk_size: usize,
    sample_rate: u32,
}

impl MemorySource {
    pub fn new(samples: Vec<i16>, chunk_size: usize, sample_rate: u32) -> Self {
        Self {
            samples,
            position: 0,
            chunk_size: chunk_size.max(1),
            sample_rate,
        }
    }
}

impl SampleSource for MemorySource {
    fn next_buffer(&mut self) -> Result<Option<Vec<i16>>> {
        if self.position >= self.samples.len() {
            return Ok(None);
        }

        let end = (self.position + self.chunk_size).min(self.samples.len());
        let chunk = self.samples[self.position..end].to_vec();
        self.position = end;

        Ok(Some(chunk))
    }

    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }
}

/// 16-bit PCM WAV file. Channels stay interleaved, so a stereo file reads
/// as `[I, Q, I, Q, ...]`.
pub struct WavSampleSource {
    inner: MemorySource,
    channels: u16,
}

impl WavSampleSource {
    pub fn open<P: AsRef<Path>>(path: P, chunk_size: usize) -> Result<Self> {
        let reader = WavReader::open(path.as_ref())?;
        let spec = reader.spec();

        if spec.sample_format != hound::SampleFormat::Int || spec.bits_per_sample != 16 {
            return Err(FirError::Config(format!(
                "expected 16-bit integer WAV, got {}-bit {:?}",
                spec.bits_per_sample, spec.sample_format
            )));
        }

        let samples = Self::read_samples(reader)?;
        log::info!(
            "Loaded {} samples ({} channel(s), {} Hz) from {}",
            samples.len(),
            spec.channels,
            spec.sample_rate,
            path.as_ref().display()
        );

        Ok(Self {
            inner: MemorySource::new(samples, chunk_size, spec.sample_rate),
            channels: spec.channels,
        })
    }

    fn read_samples(mut reader: WavReader<BufReader<File>>) -> Result<Vec<i16>> {
        Ok(reader.samples::<i16>().collect::<std::result::Result<Vec<_>, _>>()?)
    }

    pub fn channels(&self) -> u16 {
        self.channels
    }
}

impl SampleSource for WavSampleSource {
    fn next_buffer(&mut self) -> Result<Option<Vec<i16>>> {
        self.inner.next_buffer()
    }

    fn sample_rate(&self) -> u32 {
        self.inner.sample_rate()
    }
}

/// Headerless little-endian 16-bit samples, streamed from any reader.
pub struct RawSampleSource<R: Read + Send> {
    reader: R,
    chunk_size: usize,
    sample_rate: u32,
    bytes: Vec<u8>,
}

impl RawSampleSource<BufReader<File>> {
    pub fn open<P: AsRef<Path>>(path: P, chunk_size: usize, sample_rate: u32) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        Ok(Self::new(BufReader::new(file), chunk_size, sample_rate))
    }
}

impl<R: Read + Send> RawSampleSource<R> {
    pub fn new(reader: R, chunk_size: usize, sample_rate: u32) -> Self {
        let chunk_size = chunk_size.max(1);
        Self {
            reader,
            chunk_size,
            sample_rate,
            bytes: vec![0; chunk_size * 2],
        }
    }
}

impl<R: Read + Send> SampleSource for RawSampleSource<R> {
    fn next_buffer(&mut self) -> Result<Option<Vec<i16>>> {
        let mut filled = 0;
        while filled < self.bytes.len() {
            match self.reader.read(&mut self.bytes[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }

        if filled % 2 != 0 {
            log::warn!("Dropping trailing odd byte from raw input");
        }
        if filled < 2 {
            return Ok(None);
        }

        let samples = self.bytes[..filled - filled % 2]
            .chunks_exact(2)
            .map(|b| i16::from_le_bytes([b[0], b[1]]))
            .collect();
        Ok(Some(samples))
    }

    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }
}

/// Runs a source on its own thread and hands blocks over a bounded channel,
/// the way a receiver callback would deliver them.
pub struct ThreadedSource {
    rx: Receiver<Result<Vec<i16>>>,
    sample_rate: u32,
    reader: Option<JoinHandle<()>>,
}

impl ThreadedSource {
    pub fn spawn<S: SampleSource + 'static>(mut source: S, depth: usize) -> Self {
        let (tx, rx) = crossbeam_channel::bounded(depth.max(1));
        let sample_rate = source.sample_rate();

        let reader = std::thread::spawn(move || {
            loop {
                let item = match source.next_buffer() {
                    Ok(Some(block)) => Ok(block),
                    Ok(None) => break,
                    Err(e) => Err(e),
                };
                let failed = item.is_err();
                if tx.send(item).is_err() || failed {
                    break;
                }
            }
            log::debug!("Sample reader finished");
        });

        Self {
            rx,
            sample_rate,
            reader: Some(reader),
        }
    }
}

impl SampleSource for ThreadedSource {
    fn next_buffer(&mut self) -> Result<Option<Vec<i16>>> {
        match self.rx.recv() {
            Ok(block) => block.map(Some),
            Err(_) => Ok(None),
        }
    }

    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }
}

impl Drop for ThreadedSource {
    fn drop(&mut self) {
        // Unblock the reader before joining it.
        let (_, closed) = crossbeam_channel::bounded(0);
        self.rx = closed;
        if let Some(handle) = self.reader.take() {
            if handle.join().is_err() {
                log::error!("Sample reader thread panicked");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn drain<S: SampleSource>(source: &mut S) -> Vec<Vec<i16>> {
        let mut blocks = Vec::new();
        while let Some(block) = source.next_buffer().unwrap() {
            blocks.push(block);
        }
        blocks
    }

    #[test]
    fn test_memory_source_chunks() {
        let mut source = MemorySource::new((0..10).collect(), 4, 1000);
        let blocks = drain(&mut source);
        assert_eq!(blocks, vec![vec![0, 1, 2, 3], vec![4, 5, 6, 7], vec![8, 9]]);
        assert_eq!(source.sample_rate(), 1000);
    }

    #[test]
    fn test_raw_source_little_endian() {
        let bytes: Vec<u8> = [1i16, -2, 300, i16::MIN, 5]
            .iter()
            .flat_map(|s| s.to_le_bytes())
            .chain([0xff])
            .collect();
        let mut source = RawSampleSource::new(Cursor::new(bytes), 2, 48000);
        let blocks = drain(&mut source);
        assert_eq!(blocks, vec![vec![1, -2], vec![300, i16::MIN], vec![5]]);
    }

    #[test]
    fn test_threaded_source_preserves_order() {
        let samples: Vec<i16> = (0..1000).map(|i| i as i16).collect();
        let mut source = ThreadedSource::spawn(MemorySource::new(samples.clone(), 64, 1), 2);
        let collected: Vec<i16> = drain(&mut source).into_iter().flatten().collect();
        assert_eq!(collected, samples);
    }

    #[test]
    fn test_threaded_source_drop_mid_stream() {
        let samples = vec![0i16; 100_000];
        let mut source = ThreadedSource::spawn(MemorySource::new(samples, 16, 1), 1);
        assert!(source.next_buffer().unwrap().is_some());
        drop(source);
    }
}
