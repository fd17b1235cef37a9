//! Capture, average, tone-map and save, driven through the public API.

use long_exposure::capture::{CaptureError, Frame, ScreenSource, SyntheticScreen};
use long_exposure::output;
use long_exposure::session::{
    CaptureSession, ManualClock, SessionEnd, SessionEvent, SessionParams, StopSignal,
};
use long_exposure::shell;
use long_exposure::tonemap::{self, Gamma};
use long_exposure::Accumulator;

/// Screen whose every sample equals the capture number times ten.
struct Steps {
    width: u32,
    height: u32,
    captured: u64,
}

impl ScreenSource for Steps {
    fn open(&mut self) -> Result<(), CaptureError> {
        Ok(())
    }

    fn capture(&mut self) -> Result<Frame, CaptureError> {
        self.captured += 1;
        let value = (self.captured * 10) as u8;
        let len = (self.width * self.height * 3) as usize;
        Ok(Frame::new(vec![value; len], self.width, self.height, self.captured))
    }

    fn is_open(&self) -> bool {
        true
    }

    fn close(&mut self) {}
}

#[test]
fn two_second_session_saves_exact_png() {
    let dir = tempfile::tempdir().unwrap();
    let params = SessionParams {
        interval_secs: 1.0,
        duration_secs: 2,
        delay_secs: 0,
    };
    let handle = CaptureSession::start(
        params,
        Steps {
            width: 16,
            height: 9,
            captured: 0,
        },
        ManualClock::new(),
    )
    .unwrap();

    let frames: Vec<u64> = handle
        .events()
        .iter()
        .filter_map(|event| match event {
            SessionEvent::FrameCaptured { frames, .. } => Some(frames),
            _ => None,
        })
        .collect();
    let outcome = handle.wait().unwrap();

    assert_eq!(frames, vec![1, 2]);
    assert_eq!(outcome.end, SessionEnd::Completed);

    // Frames of 10 and 20 average to 15 everywhere.
    let average = outcome.average().unwrap();
    assert!(average.samples().iter().all(|&s| (s - 15.0).abs() < 1e-9));

    let gamma = Gamma::new(0.7).unwrap();
    let image = tonemap::tone_map(average, gamma);
    let path = output::save(&image, dir.path().join("out.png")).unwrap();

    let decoded = image::open(&path).unwrap().to_rgb8();
    assert_eq!(decoded, image);
    // (15 / 255)^0.7 * 255 = 35.09...
    assert!(decoded.as_raw().iter().all(|&s| s == 35));
}

#[test]
fn batch_matches_manual_pipeline() {
    let dir = tempfile::tempdir().unwrap();
    let params = SessionParams {
        interval_secs: 0.5,
        duration_secs: 2,
        delay_secs: 1,
    };
    let gamma = Gamma::new(1.4).unwrap();

    let report = shell::capture_to_file(
        params,
        gamma,
        SyntheticScreen::with_dimensions(12, 8),
        ManualClock::new(),
        &StopSignal::new(),
        &dir.path().join("batch.png"),
    )
    .unwrap();
    assert_eq!(report.frames, params.expected_frames());

    let mut screen = SyntheticScreen::with_dimensions(12, 8);
    screen.open().unwrap();
    let mut acc = Accumulator::new();
    for _ in 0..report.frames {
        acc.add(&screen.capture().unwrap()).unwrap();
    }
    let expected = tonemap::tone_map(acc.current().unwrap(), gamma);

    let decoded = image::open(&report.path).unwrap().to_rgb8();
    assert_eq!(decoded, expected);
}
