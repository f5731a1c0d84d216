//! Faction languages: lexicon genesis, grammar growth, lexical drift,
//! cross-faction borrowing, and utterance composition.

use crate::rng::Rng;
use tellus_data::{CommunicationState, Concept};

/// Ticks between grammar re-evaluations.
pub const GRAMMAR_INTERVAL: u64 = 120;
/// Ticks between lexical drift passes.
pub const DRIFT_INTERVAL: u64 = 260;
/// Minimum ticks between borrow events on the receiving side.
pub const BORROW_COOLDOWN: u64 = 60;

const DRIFT_CHANCE: f64 = 0.08;
const ALPHABET: &[u8] = b"aeiouktrsnmlgdh";

const ONSETS: [&str; 12] = [
    "ka", "tu", "mo", "ri", "sha", "ne", "go", "li", "va", "du", "pe", "so",
];
const CODAS: [&str; 12] = [
    "rak", "min", "tol", "esh", "un", "gar", "ith", "om", "ek", "ul", "an", "or",
];

/// Builds the founding lexicon for a faction, one token per concept.
pub fn init_lexicon(seed: u32, rng: &mut Rng) -> CommunicationState {
    let mut state = CommunicationState::default();
    for (i, concept) in Concept::ALL.into_iter().enumerate() {
        let onset = ONSETS[((seed as usize).wrapping_add(i * 7) + rng.next_int(3)) % ONSETS.len()];
        let coda = CODAS[((seed as usize).wrapping_mul(13).wrapping_add(i * 11)
            + rng.next_int(3))
            % CODAS.len()];
        state.lexicon.insert(concept, format!("{onset}{coda}"));
    }
    state
}

/// Grammar level target by faction population.
fn grammar_target(population: usize) -> u8 {
    match population {
        0..=18 => 0,
        19..=45 => 1,
        46..=90 => 2,
        _ => 3,
    }
}

/// Periodic language update. Grammar tracks its population target
/// modulated by social stability; the lexicon drifts on its own cadence.
pub fn step(
    state: &mut CommunicationState,
    population: usize,
    stress: f64,
    tick: u64,
    rng: &mut Rng,
) {
    if tick % GRAMMAR_INTERVAL == 0 {
        let stability = (1.0 - stress).clamp(0.0, 1.0);
        let target = grammar_target(population);
        if state.grammar_level < target && rng.chance(0.2 * (0.5 + 0.5 * stability)) {
            state.grammar_level += 1;
        } else if state.grammar_level > target && rng.chance(0.15) {
            state.grammar_level -= 1;
        }
    }

    if tick % DRIFT_INTERVAL == 0 && tick > state.last_drift_tick {
        drift(state, rng);
        state.last_drift_tick = tick;
    }
}

/// Each concept's token mutates with a small probability by replacing,
/// inserting, or deleting one character.
fn drift(state: &mut CommunicationState, rng: &mut Rng) {
    for concept in Concept::ALL {
        if !rng.chance(DRIFT_CHANCE) {
            continue;
        }
        let Some(token) = state.lexicon.get(&concept) else {
            continue;
        };
        let mut chars: Vec<u8> = token.bytes().collect();
        let letter = ALPHABET[rng.next_index(ALPHABET.len())];
        match rng.next_index(3) {
            0 => {
                let at = rng.next_index(chars.len());
                chars[at] = letter;
            }
            1 => {
                let at = rng.next_index(chars.len() + 1).min(chars.len());
                chars.insert(at, letter);
            }
            _ => {
                if chars.len() > 2 {
                    let at = rng.next_index(chars.len());
                    chars.remove(at);
                }
            }
        }
        if let Ok(next) = String::from_utf8(chars) {
            state.lexicon.insert(concept, next);
        }
    }
}

/// Copies donor tokens into the receiver, per concept with probability
/// equal to the contact intensity. Requires the receiver's borrow
/// cooldown to have elapsed.
pub fn borrow(
    receiver: &mut CommunicationState,
    donor: &CommunicationState,
    intensity: f64,
    tick: u64,
    rng: &mut Rng,
) -> usize {
    if tick.saturating_sub(receiver.last_borrow_tick) < BORROW_COOLDOWN {
        return 0;
    }
    let intensity = intensity.clamp(0.0, 1.0);
    let mut borrowed = 0;
    for concept in Concept::ALL {
        if let Some(token) = donor.token(concept) {
            if rng.chance(intensity) {
                receiver.lexicon.insert(concept, token.to_string());
                borrowed += 1;
            }
        }
    }
    if borrowed > 0 {
        receiver.last_borrow_tick = tick;
    }
    borrowed
}

/// Composes an utterance over the selected concepts. Higher grammar levels
/// append or prepend LAW/GOD/SHELTER markers and lift the length cap.
pub fn compose_utterance(
    state: &CommunicationState,
    concepts: &[Concept],
    rng: &mut Rng,
) -> Vec<String> {
    let mut tokens: Vec<String> = concepts
        .iter()
        .filter_map(|c| state.token(*c).map(str::to_string))
        .collect();

    if state.grammar_level >= 1 && rng.chance(0.4) {
        if let Some(t) = state.token(Concept::Law) {
            tokens.push(t.to_string());
        }
    }
    if state.grammar_level >= 2 && rng.chance(0.35) {
        if let Some(t) = state.token(Concept::God) {
            tokens.insert(0, t.to_string());
        }
    }
    if state.grammar_level >= 1 && rng.chance(0.25) {
        if let Some(t) = state.token(Concept::Shelter) {
            tokens.push(t.to_string());
        }
    }

    let cap = match state.grammar_level {
        0 => 2,
        1 => 3,
        _ => usize::MAX,
    };
    tokens.truncate(cap);
    tokens
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lexicon_covers_all_concepts() {
        let state = init_lexicon(42, &mut Rng::new(42));
        assert_eq!(state.lexicon.len(), Concept::ALL.len());
        for concept in Concept::ALL {
            assert!(!state.token(concept).unwrap().is_empty());
        }
    }

    #[test]
    fn lexicon_is_seed_deterministic() {
        let a = init_lexicon(7, &mut Rng::new(7));
        let b = init_lexicon(7, &mut Rng::new(7));
        assert_eq!(a.lexicon, b.lexicon);
    }

    #[test]
    fn drift_keeps_tokens_nonempty() {
        let mut state = init_lexicon(3, &mut Rng::new(3));
        let mut rng = Rng::new(9);
        for tick in 1..=40 {
            step(&mut state, 30, 0.2, tick * DRIFT_INTERVAL, &mut rng);
        }
        for concept in Concept::ALL {
            assert!(state.token(concept).unwrap().len() >= 2);
        }
    }

    #[test]
    fn borrow_respects_cooldown() {
        let donor = init_lexicon(1, &mut Rng::new(1));
        let mut receiver = init_lexicon(2, &mut Rng::new(2));
        receiver.last_borrow_tick = 100;
        let n = borrow(&mut receiver, &donor, 1.0, 120, &mut Rng::new(5));
        assert_eq!(n, 0);
        let n = borrow(&mut receiver, &donor, 1.0, 200, &mut Rng::new(5));
        assert_eq!(n, Concept::ALL.len());
        assert_eq!(receiver.lexicon, donor.lexicon);
    }

    #[test]
    fn utterance_respects_grammar_cap() {
        let mut state = init_lexicon(4, &mut Rng::new(4));
        state.grammar_level = 0;
        let tokens = compose_utterance(
            &state,
            &[Concept::Food, Concept::Water, Concept::Danger],
            &mut Rng::new(8),
        );
        assert!(tokens.len() <= 2);
    }
}
