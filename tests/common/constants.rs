//! Shared constants for end-to-end tests
//!
//! When test users or stub Pokémon change, update only this file.

// ============================================================================
// Test Users
// ============================================================================

/// User created in every test database
pub const TEST_USER_EMAIL: &str = "ash@example.com";

/// Second user, for ownership checks
pub const OTHER_USER_EMAIL: &str = "misty@example.com";

/// Email that never exists
pub const UNKNOWN_EMAIL: &str = "nobody@example.com";

// ============================================================================
// Stub Pokémon
// ============================================================================

pub const PIKACHU_ID: u32 = 25;
pub const PIKACHU_NAME: &str = "pikachu";
pub const PIKACHU_BASE_EXPERIENCE: u32 = 112;

pub const BULBASAUR_ID: u32 = 1;
pub const BULBASAUR_NAME: &str = "bulbasaur";

/// Identifier the stub lookup reports as missing
pub const MISSING_POKEMON: &str = "missingno";

/// Identifier the stub lookup fails with a timeout for
pub const SLOW_POKEMON: &str = "slowpoke-timeout";

// ============================================================================
// Auth
// ============================================================================

pub const TEST_JWT_SECRET: &[u8] = b"e2e-test-secret";

// ============================================================================
// Timeouts
// ============================================================================

/// Maximum time to wait for the server to answer its health check
pub const SERVER_READY_TIMEOUT_MS: u64 = 5000;

/// Timeout for individual HTTP requests
pub const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Interval between health check polls
pub const SERVER_READY_POLL_INTERVAL_MS: u64 = 50;
