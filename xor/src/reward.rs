//! Reward shaping for lifetime learning: turns a scalar reward
//! into training targets for the network's own outputs.

/// Factor applied to outputs that earned a positive reward.
pub const REINFORCEMENT_GAIN: f32 = 1.2;

/// Returns the training targets for `outputs` given `reward`.
///
/// Rewarded outputs are reinforced by amplifying them;
/// otherwise the network is pushed the other way by
/// negating them.
pub fn shaped_targets(reward: f32, outputs: &[f32]) -> Vec<f32> {
    if reward > 0.0 {
        outputs.iter().map(|o| o * REINFORCEMENT_GAIN).collect()
    } else {
        outputs.iter().map(|o| -o).collect()
    }
}

/// Rewards an XOR answer: 1 for an exact answer, decreasing
/// linearly with the error, and non-positive once the answer
/// is off by half or more.
pub fn xor_reward(expected: f32, output: f32) -> f32 {
    1.0 - 2.0 * (expected - output).abs()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positive_reward_amplifies() {
        assert_eq!(shaped_targets(0.3, &[0.5, -1.0]), vec![0.5 * 1.2, -1.2]);
    }

    #[test]
    fn non_positive_reward_inverts() {
        assert_eq!(shaped_targets(0.0, &[0.5, -1.0]), vec![-0.5, 1.0]);
        assert_eq!(shaped_targets(-2.0, &[0.25]), vec![-0.25]);
        assert!(shaped_targets(1.0, &[]).is_empty());
    }

    #[test]
    fn xor_reward_sign() {
        assert_eq!(xor_reward(1.0, 1.0), 1.0);
        assert!(xor_reward(0.0, 0.2) > 0.0);
        assert_eq!(xor_reward(0.0, 0.5), 0.0);
        assert!(xor_reward(1.0, 0.1) < 0.0);
    }
}
