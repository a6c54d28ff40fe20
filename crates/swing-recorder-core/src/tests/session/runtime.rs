use super::{CaptureCall, MockCapture, PhaseLog, config, phases};
use crate::{
    CaptureMode, CoreResult, FrameInfo, SessionConfig, SessionError, SessionHandle, SessionInbox,
    SessionPhase, SessionRuntime,
};

use std::{
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};

use tokio::task::JoinHandle;

struct Harness {
    handle: SessionHandle,
    inbox_sender: crate::EventSender,
    capture: MockCapture,
    log: PhaseLog,
    task: JoinHandle<CoreResult<()>>,
}

fn spawn_runtime(session_config: SessionConfig, capture: MockCapture) -> Harness {
    let inbox = SessionInbox::default();
    let inbox_sender = inbox.sender();
    let (mut runtime, handle) = SessionRuntime::new(session_config, Box::new(capture.clone()), inbox);

    let log: PhaseLog = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&log);
    runtime.on_phase_change(move |snapshot| {
        sink.lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(snapshot.phase);
    });

    let task = tokio::spawn(runtime.run());

    Harness {
        handle,
        inbox_sender,
        capture,
        log,
        task,
    }
}

/// WHAT: Timer-driven run from detection to StopRecording
/// WHY: The runtime must schedule one tick per interval and stop exactly at the limit
#[tokio::test(start_paused = true)]
#[allow(clippy::unwrap_used)]
async fn given_running_runtime_when_person_detected_then_records_for_limit_and_stops() {
    // Given: A runtime with countdown 5 and limit 30
    let harness = spawn_runtime(config(5, 30), MockCapture::new());
    harness.handle.start(CaptureMode::RecordMovie).await.unwrap();

    // When: A person is detected and the clock runs
    harness.handle.report_person_detected(true).await.unwrap();
    let recording = harness
        .handle
        .wait_for_phase(|phase| phase == SessionPhase::Recording)
        .await
        .unwrap();
    let stopped = harness
        .handle
        .wait_for_phase(|phase| phase == SessionPhase::StopRecording)
        .await
        .unwrap();

    // Then: Countdown drained, full window recorded, every phase observed once
    assert_eq!(recording.countdown_remaining, 0);
    assert_eq!(stopped.recording_elapsed, 30);
    assert_eq!(
        phases(&harness.log),
        vec![
            SessionPhase::FindingPerson,
            SessionPhase::CountdownTimer,
            SessionPhase::Recording,
            SessionPhase::StopRecording,
        ]
    );
    assert_eq!(
        harness.capture.calls(),
        vec![
            CaptureCall::Acquire,
            CaptureCall::Begin(CaptureMode::RecordMovie),
            CaptureCall::End
        ]
    );

    // And: Shutdown releases the camera
    harness.handle.shutdown().await.unwrap();
    harness.task.await.unwrap().unwrap();
    assert_eq!(harness.capture.count(CaptureCall::Release), 1);
}

/// WHAT: The recording window lasts limit times the tick interval
/// WHY: Ticks are driven by wall-clock time, one per interval
#[tokio::test(start_paused = true)]
#[allow(clippy::unwrap_used)]
async fn given_detected_person_when_time_passes_then_phases_follow_the_clock() {
    // Given: A runtime with countdown 2 and limit 3
    let harness = spawn_runtime(config(2, 3), MockCapture::new());
    harness.handle.start(CaptureMode::RecordMovie).await.unwrap();
    harness.handle.report_person_detected(true).await.unwrap();

    // When: 1.5 seconds pass
    tokio::time::sleep(Duration::from_millis(1500)).await;

    // Then: One countdown tick happened
    let snapshot = harness.handle.snapshot().unwrap();
    assert_eq!(snapshot.phase, SessionPhase::CountdownTimer);
    assert_eq!(snapshot.countdown_remaining, 1);

    // When: Another 3 seconds pass (countdown ends at 2 s, elapsed 2 at 4 s)
    tokio::time::sleep(Duration::from_secs(3)).await;

    // Then: Recording is under way but not finished
    let snapshot = harness.handle.snapshot().unwrap();
    assert_eq!(snapshot.phase, SessionPhase::Recording);
    assert_eq!(snapshot.recording_elapsed, 2);

    // When: One more second passes
    tokio::time::sleep(Duration::from_secs(1)).await;

    // Then: Stopped
    assert_eq!(
        harness.handle.snapshot().unwrap().phase,
        SessionPhase::StopRecording
    );
}

/// WHAT: Cancel during the countdown freezes the session
/// WHY: No tick delivered after cancel may cause a further change
#[tokio::test(start_paused = true)]
#[allow(clippy::unwrap_used)]
async fn given_countdown_after_two_ticks_when_cancelled_then_frozen_at_three() {
    // Given: A five-step countdown that has run for 2.5 seconds
    let harness = spawn_runtime(config(5, 30), MockCapture::new());
    harness.handle.start(CaptureMode::RecordMovie).await.unwrap();
    harness.handle.report_person_detected(true).await.unwrap();
    tokio::time::sleep(Duration::from_millis(2500)).await;
    assert_eq!(harness.handle.snapshot().unwrap().countdown_remaining, 3);

    // When: Cancelling and letting plenty of time pass
    harness.handle.cancel().await.unwrap();
    harness
        .handle
        .wait_for_phase(|phase| phase == SessionPhase::Cancelled)
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_secs(60)).await;

    // Then: Cancelled, countdown frozen, capture never begun
    let snapshot = harness.handle.snapshot().unwrap();
    assert_eq!(snapshot.phase, SessionPhase::Cancelled);
    assert_eq!(snapshot.countdown_remaining, 3);
    assert_eq!(
        harness.capture.calls(),
        vec![CaptureCall::Acquire, CaptureCall::Release]
    );
}

/// WHAT: An invalid configuration is reported to the start caller
/// WHY: InvalidConfiguration is fatal to the session and must not be swallowed
#[tokio::test(start_paused = true)]
#[allow(clippy::unwrap_used)]
async fn given_zero_limit_when_starting_through_handle_then_invalid_configuration() {
    // Given: A runtime with a zero recording limit
    let harness = spawn_runtime(config(5, 0), MockCapture::new());

    // When: Starting
    let result = harness.handle.start(CaptureMode::RecordMovie).await;

    // Then: The caller sees the error and nothing was published or observed
    assert!(matches!(
        result,
        Err(SessionError::InvalidConfiguration { .. })
    ));
    assert!(harness.handle.snapshot().is_none());
    assert!(phases(&harness.log).is_empty());
}

/// WHAT: Worker threads feed the controller through the event sender
/// WHY: Frame callbacks run off the interaction context and may only post events
#[tokio::test(start_paused = true)]
#[allow(clippy::unwrap_used)]
async fn given_worker_thread_when_posting_frames_and_detection_then_countdown_starts() {
    // Given: A started runtime and a sender moved onto a plain thread
    let harness = spawn_runtime(config(5, 30), MockCapture::new());
    harness
        .handle
        .start(CaptureMode::StreamForProcessing)
        .await
        .unwrap();
    let sender = harness.inbox_sender.clone();

    // When: The worker posts a few frames then a positive detection
    let worker = std::thread::spawn(move || {
        for sequence in 0..3 {
            sender.post_frame(FrameInfo {
                sequence,
                timestamp: Duration::from_millis(sequence * 33),
            });
        }
        sender.post_detection(true)
    });
    worker.join().unwrap().unwrap();

    // Then: The runtime moves to the countdown having counted the frames
    let snapshot = harness
        .handle
        .wait_for_phase(|phase| phase == SessionPhase::CountdownTimer)
        .await
        .unwrap();
    assert_eq!(snapshot.frames_received, 3);
    assert!(snapshot.person_in_view);
}

/// WHAT: A device failure posted by the collaborator cancels the session
/// WHY: CaptureUnavailable forces Cancelled without a retry
#[tokio::test(start_paused = true)]
#[allow(clippy::unwrap_used)]
async fn given_recording_when_capture_failure_posted_then_cancelled() {
    // Given: A session that has started recording
    let harness = spawn_runtime(config(0, 30), MockCapture::new());
    harness.handle.start(CaptureMode::RecordMovie).await.unwrap();
    harness.handle.report_person_detected(true).await.unwrap();
    harness
        .handle
        .wait_for_phase(|phase| phase == SessionPhase::Recording)
        .await
        .unwrap();

    // When: The collaborator reports a lost device
    harness
        .inbox_sender
        .post_capture_failed("camera disconnected")
        .unwrap();

    // Then: Cancelled and released, never stopped normally
    harness
        .handle
        .wait_for_phase(|phase| phase == SessionPhase::Cancelled)
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_secs(60)).await;
    assert_eq!(
        harness.handle.snapshot().unwrap().phase,
        SessionPhase::Cancelled
    );
    assert!(!phases(&harness.log).contains(&SessionPhase::StopRecording));
    assert_eq!(harness.capture.count(CaptureCall::Release), 1);
}

/// WHAT: Dropping every sender stops the runtime and frees the camera
/// WHY: Tearing down the hosting view must release capture resources
#[tokio::test(start_paused = true)]
#[allow(clippy::unwrap_used)]
async fn given_live_session_when_all_senders_dropped_then_runtime_exits_and_releases() {
    // Given: A session counting down
    let Harness {
        handle,
        inbox_sender,
        capture,
        log,
        task,
    } = spawn_runtime(config(5, 30), MockCapture::new());
    handle.start(CaptureMode::RecordMovie).await.unwrap();
    handle.report_person_detected(true).await.unwrap();

    // When: Every handle and sender goes away
    drop(handle);
    drop(inbox_sender);
    task.await.unwrap().unwrap();

    // Then: The session was cancelled and the camera released
    assert_eq!(phases(&log).last(), Some(&SessionPhase::Cancelled));
    assert_eq!(capture.count(CaptureCall::Release), 1);
}

/// WHAT: Senders fail cleanly once the runtime is gone
/// WHY: Capture workers must learn the session ended instead of blocking
#[tokio::test(start_paused = true)]
#[allow(clippy::unwrap_used)]
async fn given_stopped_runtime_when_posting_then_channel_send_failed() {
    // Given: A runtime that has shut down
    let harness = spawn_runtime(config(5, 30), MockCapture::new());
    harness.handle.shutdown().await.unwrap();
    harness.task.await.unwrap().unwrap();

    // When: Posting from a worker and starting from the handle
    let posted = harness.inbox_sender.post_detection(true);
    let started = harness.handle.start(CaptureMode::RecordMovie).await;

    // Then: Both report the closed channel
    assert!(harness.inbox_sender.is_closed());
    assert!(matches!(
        posted,
        Err(SessionError::ChannelSendFailed { .. })
    ));
    assert!(matches!(
        started,
        Err(SessionError::ChannelSendFailed { .. })
    ));
    assert!(!harness.inbox_sender.post_frame(FrameInfo {
        sequence: 0,
        timestamp: Duration::ZERO,
    }));
}

/// WHAT: A saturated inbox does not hold back the timer
/// WHY: Ticks pace the countdown and recording window while frames pour in
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
#[allow(clippy::unwrap_used)]
async fn given_frame_worker_flooding_inbox_when_session_runs_then_recording_still_completes() {
    // Given: 10 ms ticks and a worker posting frames as fast as it can
    let session_config = SessionConfig {
        tick_interval: Duration::from_millis(10),
        ..config(3, 5)
    };
    let harness = spawn_runtime(session_config, MockCapture::new());
    harness
        .handle
        .start(CaptureMode::StreamForProcessing)
        .await
        .unwrap();

    let flooding = Arc::new(AtomicBool::new(true));
    let running = Arc::clone(&flooding);
    let sender = harness.inbox_sender.clone();
    let worker = std::thread::spawn(move || {
        let mut sequence = 0;
        while running.load(Ordering::Relaxed) {
            sender.post_frame(FrameInfo {
                sequence,
                timestamp: Duration::ZERO,
            });
            sequence += 1;
        }
    });

    // When: A person is detected while the inbox is saturated
    harness.handle.report_person_detected(true).await.unwrap();
    let stopped = tokio::time::timeout(
        Duration::from_secs(5),
        harness
            .handle
            .wait_for_phase(|phase| phase == SessionPhase::StopRecording),
    )
    .await;

    flooding.store(false, Ordering::Relaxed);
    worker.join().unwrap();

    // Then: The full window was recorded on time and frames kept arriving
    let stopped = stopped.unwrap().unwrap();
    assert_eq!(stopped.recording_elapsed, 5);
    assert!(stopped.frames_received > 0);
}
