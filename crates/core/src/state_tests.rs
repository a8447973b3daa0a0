// SPDX-License-Identifier: MIT

use yare::parameterized;

use super::*;

#[test]
fn initial_state_is_wait() {
    assert_eq!(StepState::INITIAL, StepState::Wait);
}

#[parameterized(
    wait = { StepState::Wait, false },
    ready = { StepState::Ready, false },
    run = { StepState::Run, false },
    paused = { StepState::Paused, false },
    blocked = { StepState::Blocked, false },
    interrupted = { StepState::Interrupted, false },
    success = { StepState::Success, true },
    failure = { StepState::Failure, true },
    skipped = { StepState::Skipped, true },
    unreachable = { StepState::Unreachable, true },
)]
fn terminal_per_state(state: StepState, expected: bool) {
    assert_eq!(state.is_terminal(), expected, "{state} terminal should be {expected}");
}

#[parameterized(
    success = { StepState::Success, true },
    failure = { StepState::Failure, true },
    skipped = { StepState::Skipped, true },
    unreachable = { StepState::Unreachable, false },
    run = { StepState::Run, false },
    wait = { StepState::Wait, false },
)]
fn rerunnable_per_state(state: StepState, expected: bool) {
    assert_eq!(state.is_rerunnable(), expected, "{state} rerunnable should be {expected}");
}

#[parameterized(
    success = { StepState::Success, true },
    skipped = { StepState::Skipped, true },
    failure = { StepState::Failure, false },
    unreachable = { StepState::Unreachable, false },
    run = { StepState::Run, false },
)]
fn unblocks_successors_per_state(state: StepState, expected: bool) {
    assert_eq!(state.unblocks_successors(), expected, "{state} unblocks_successors should be {expected}");
}

#[test]
fn flags_default_is_empty() {
    let flags = StepFlags::default();
    assert!(flags.is_empty());
}

#[test]
fn any_flag_set_makes_flags_non_empty() {
    let mut flags = StepFlags::default();
    flags.pause_requested = true;
    assert!(!flags.is_empty());
}

#[test]
fn display_matches_snake_case_names() {
    assert_eq!(StepState::Run.to_string(), "run");
    assert_eq!(StepStatus::Success.to_string(), "success");
}
