// src/gps/receiver.rs
//! Single-shot fix acquisition over a serial NMEA stream
//!
//! Each `NmeaReceiver` runs one acquisition: open the device, read lines
//! until the first recognized GGA/RMC sentence decodes, and report that fix.
//! The receiver never re-enters the listening state after a terminal outcome.
//!
//! Access to the protocol read loop goes through a `ReadScheduler`. The
//! scheduler always grants an exclusive per-device lease; under the
//! `Serialized` policy it additionally hands out a single global token, so
//! all sentence reads in the process are sequential even across distinct
//! devices. That makes "concurrent" dual acquisition effectively sequential
//! at the read level — a deliberate, visible policy rather than an implicit
//! global lock.

use std::collections::HashMap;
use std::sync::{Arc, Mutex as StdMutex};
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::sync::{Mutex, OwnedMutexGuard};
use tokio::time;
use tokio_serial::{SerialPort, SerialPortBuilderExt};

use super::data::Fix;
use super::nmea;
use crate::error::{KmlGenError, Result};

pub const DEFAULT_BAUD_RATE: u32 = 9600;
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(5);
pub const SUPPORTED_BAUD_RATES: [u32; 6] = [4800, 9600, 19200, 38400, 57600, 115200];

/// How the scheduler arbitrates the sentence-read loop across receivers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadPolicy {
    /// Exclusive access per device; distinct devices may read concurrently.
    PerDevice,
    /// Per-device exclusivity plus one global token: all protocol reads in
    /// the process are sequential, matching the reference behavior.
    Serialized,
}

/// Grants read leases to receivers.
pub struct ReadScheduler {
    policy: ReadPolicy,
    global: Arc<Mutex<()>>,
    devices: StdMutex<HashMap<String, Arc<Mutex<()>>>>,
}

/// Held for the duration of one acquisition's read loop; released on drop
/// on every exit path.
pub struct ReadLease {
    _device: OwnedMutexGuard<()>,
    _global: Option<OwnedMutexGuard<()>>,
}

impl ReadScheduler {
    pub fn new(policy: ReadPolicy) -> Self {
        Self {
            policy,
            global: Arc::new(Mutex::new(())),
            devices: StdMutex::new(HashMap::new()),
        }
    }

    pub fn policy(&self) -> ReadPolicy {
        self.policy
    }

    /// Wait for exclusive read access to `device`.
    ///
    /// Lock order is always device first, then the global token, so mixed
    /// callers cannot deadlock.
    pub async fn lease(&self, device: &str) -> ReadLease {
        let device_lock = {
            let mut map = self.devices.lock().unwrap();
            Arc::clone(
                map.entry(device.to_string())
                    .or_insert_with(|| Arc::new(Mutex::new(()))),
            )
        };
        let device_guard = device_lock.lock_owned().await;

        let global_guard = match self.policy {
            ReadPolicy::Serialized => Some(Arc::clone(&self.global).lock_owned().await),
            ReadPolicy::PerDevice => None,
        };

        ReadLease {
            _device: device_guard,
            _global: global_guard,
        }
    }
}

impl Default for ReadScheduler {
    fn default() -> Self {
        Self::new(ReadPolicy::Serialized)
    }
}

/// Parameters for one acquisition attempt.
#[derive(Debug, Clone)]
pub struct AcquireSpec {
    pub device: String,
    pub baud_rate: u32,
    pub read_timeout: Duration,
}

impl AcquireSpec {
    pub fn new(device: impl Into<String>, baud_rate: u32) -> Self {
        Self {
            device: device.into(),
            baud_rate,
            read_timeout: DEFAULT_READ_TIMEOUT,
        }
    }

    pub fn with_read_timeout(mut self, read_timeout: Duration) -> Self {
        self.read_timeout = read_timeout;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReceiverState {
    Idle,
    Connecting,
    Listening,
    FixAcquired,
    Failed,
}

/// Single-shot NMEA fix receiver.
pub struct NmeaReceiver {
    scheduler: Arc<ReadScheduler>,
    state: ReceiverState,
}

impl NmeaReceiver {
    pub fn new(scheduler: Arc<ReadScheduler>) -> Self {
        Self {
            scheduler,
            state: ReceiverState::Idle,
        }
    }

    pub fn state(&self) -> ReceiverState {
        self.state
    }

    /// Acquire one fix from the given device.
    ///
    /// The whole read loop is bounded by `spec.read_timeout`; the port and
    /// the read lease are released on every exit path, including when the
    /// returned future is dropped. A receiver is single-shot: calling this
    /// again after any terminal outcome is an error.
    pub async fn acquire(&mut self, spec: &AcquireSpec) -> Result<Fix> {
        if self.state != ReceiverState::Idle {
            return Err(KmlGenError::Other(format!(
                "receiver already used for {} ({:?})",
                spec.device, self.state
            )));
        }

        self.state = ReceiverState::Connecting;
        let lease = self.scheduler.lease(&spec.device).await;

        let serial = match tokio_serial::new(&spec.device, spec.baud_rate)
            .timeout(spec.read_timeout)
            .open_native_async()
        {
            Ok(serial) => serial,
            Err(e) => {
                self.state = ReceiverState::Failed;
                return Err(KmlGenError::Port(format!(
                    "Failed to open serial port {}: {}",
                    spec.device, e
                )));
            }
        };

        // Drop whatever the device buffered before this acquisition started.
        if let Err(e) = serial.clear(tokio_serial::ClearBuffer::Input) {
            self.state = ReceiverState::Failed;
            return Err(KmlGenError::Serial(e));
        }

        self.state = ReceiverState::Listening;
        let outcome = time::timeout(
            spec.read_timeout,
            read_first_fix(serial, &spec.device),
        )
        .await;
        drop(lease);

        match outcome {
            Ok(Ok(fix)) => {
                self.state = ReceiverState::FixAcquired;
                Ok(fix)
            }
            Ok(Err(e)) => {
                self.state = ReceiverState::Failed;
                Err(e)
            }
            Err(_elapsed) => {
                self.state = ReceiverState::Failed;
                Err(KmlGenError::Timeout {
                    device: spec.device.clone(),
                })
            }
        }
    }
}

/// Read lines from `reader` until the first recognized sentence decodes.
///
/// Bytes are decoded lossily (invalid bytes replaced, never rejected).
/// Unrecognized and malformed lines are skipped; EOF is a transport error.
async fn read_first_fix<R>(reader: R, source_id: &str) -> Result<Fix>
where
    R: AsyncRead + Unpin,
{
    let mut reader = BufReader::new(reader);
    let mut buf = Vec::new();

    loop {
        buf.clear();
        let n = reader
            .read_until(b'\n', &mut buf)
            .await
            .map_err(|e| KmlGenError::Port(format!("Read failure on {}: {}", source_id, e)))?;
        if n == 0 {
            return Err(KmlGenError::Port(format!(
                "Device {} closed the stream before a fix was acquired",
                source_id
            )));
        }

        let decoded = String::from_utf8_lossy(&buf);
        let line = decoded.trim();
        if line.is_empty() {
            continue;
        }

        if let Some(point) = nmea::parse_fix(line) {
            return Ok(Fix::new(point, source_id));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GGA: &str = "$GPGGA,123519,4807.038,N,01131.000,E,1,08,0.9,545.4,M,46.9,M,,*47";

    #[tokio::test]
    async fn test_first_valid_sentence_wins() {
        let stream: &[u8] =
            b"$GPGSV,3,1,12,01,40,083,46*75\r\n\
              $GPGGA,,,,,,,,,,,,,,*00\r\n\
              $GPGGA,123519,4807.038,N,01131.000,E,1,08,0.9,545.4,M,46.9,M,,*47\r\n\
              $GPRMC,123520,A,4807.000,N,01131.000,E,022.4,084.4,230394,003.1,W*6A\r\n";
        let fix = read_first_fix(stream, "test-port").await.unwrap();
        assert!((fix.point.latitude - 48.1173).abs() < 1e-3);
        assert_eq!(fix.source_id, "test-port");
    }

    #[tokio::test]
    async fn test_invalid_bytes_replaced_not_fatal() {
        let mut stream = b"\xff\xfe garbage \xff\r\n".to_vec();
        stream.extend_from_slice(GGA.as_bytes());
        stream.extend_from_slice(b"\r\n");
        let fix = read_first_fix(stream.as_slice(), "test-port").await.unwrap();
        assert!((fix.point.longitude - 11.5167).abs() < 1e-3);
    }

    #[tokio::test]
    async fn test_eof_without_fix_is_port_error() {
        let stream: &[u8] = b"$GPTXT,01,01,02,u-blox ag*50\r\n";
        let err = read_first_fix(stream, "test-port").await.unwrap_err();
        assert!(matches!(err, KmlGenError::Port(_)));
    }

    #[tokio::test]
    async fn test_receiver_is_single_shot() {
        let scheduler = Arc::new(ReadScheduler::default());
        let mut receiver = NmeaReceiver::new(scheduler);
        let spec = AcquireSpec::new("/dev/nonexistent-gps-device", DEFAULT_BAUD_RATE)
            .with_read_timeout(Duration::from_millis(100));

        assert!(receiver.acquire(&spec).await.is_err());
        assert_eq!(receiver.state(), ReceiverState::Failed);

        // Terminal state: a second attempt is refused outright.
        let err = receiver.acquire(&spec).await.unwrap_err();
        assert!(matches!(err, KmlGenError::Other(_)));
    }

    #[tokio::test]
    async fn test_serialized_policy_blocks_across_devices() {
        let scheduler = Arc::new(ReadScheduler::new(ReadPolicy::Serialized));
        let lease_a = scheduler.lease("/dev/ttyUSB0").await;

        let blocked =
            time::timeout(Duration::from_millis(50), scheduler.lease("/dev/ttyUSB1")).await;
        assert!(blocked.is_err());

        drop(lease_a);
        let granted =
            time::timeout(Duration::from_millis(50), scheduler.lease("/dev/ttyUSB1")).await;
        assert!(granted.is_ok());
    }

    #[tokio::test]
    async fn test_per_device_policy_allows_distinct_devices() {
        let scheduler = Arc::new(ReadScheduler::new(ReadPolicy::PerDevice));
        let _lease_a = scheduler.lease("/dev/ttyUSB0").await;

        let granted =
            time::timeout(Duration::from_millis(50), scheduler.lease("/dev/ttyUSB1")).await;
        assert!(granted.is_ok());

        // Same device stays exclusive.
        let blocked =
            time::timeout(Duration::from_millis(50), scheduler.lease("/dev/ttyUSB0")).await;
        assert!(blocked.is_err());
    }
}
