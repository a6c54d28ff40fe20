use crate::{Countdown, CountdownStep};

/// WHAT: A countdown of five expires on exactly the fifth tick
/// WHY: The tick that reaches zero must fire the zero transition in the same turn
#[test]
fn given_countdown_of_five_when_ticked_five_times_then_expires_on_fifth_tick() {
    // Given: A fresh five-step countdown
    let mut countdown = Countdown::new(5);

    // When: Ticking four times
    let steps: Vec<CountdownStep> = (0..4).map(|_| countdown.tick()).collect();

    // Then: Each tick reports the remaining steps and nothing has expired
    assert_eq!(
        steps,
        vec![
            CountdownStep::Ticked { remaining: 4 },
            CountdownStep::Ticked { remaining: 3 },
            CountdownStep::Ticked { remaining: 2 },
            CountdownStep::Ticked { remaining: 1 },
        ]
    );
    assert!(!countdown.is_expired());

    // And: The fifth tick expires it
    assert_eq!(countdown.tick(), CountdownStep::Expired);
    assert_eq!(countdown.remaining(), 0);
    assert_eq!(countdown.elapsed(), 5);
}

/// WHAT: Ticks after expiry change nothing
/// WHY: A second timer firing after zero must not re-trigger the transition
#[test]
fn given_expired_countdown_when_ticked_again_then_already_expired_and_unchanged() {
    // Given: An expired two-step countdown
    let mut countdown = Countdown::new(2);
    countdown.tick();
    assert_eq!(countdown.tick(), CountdownStep::Expired);

    // When: Ticking several more times
    let late: Vec<CountdownStep> = (0..3).map(|_| countdown.tick()).collect();

    // Then: Every late tick is ignored and the counter stays at its floor
    assert!(late.iter().all(|s| *s == CountdownStep::AlreadyExpired));
    assert_eq!(countdown.remaining(), 0);
    assert_eq!(countdown.elapsed(), 2);
}

/// WHAT: A zero-length countdown expires on its first tick
/// WHY: Configuring no pre-roll must still open the capture window
#[test]
fn given_zero_length_countdown_when_ticked_then_expires_immediately() {
    // Given: A zero-step countdown
    let mut countdown = Countdown::new(0);

    // When: Ticking once
    let step = countdown.tick();

    // Then: It expires without underflowing
    assert_eq!(step, CountdownStep::Expired);
    assert_eq!(countdown.remaining(), 0);
    assert_eq!(countdown.elapsed(), 0);
    assert_eq!(countdown.duration(), 0);
}
