//! Property-based tests for the adaptive right-rectangle integrator.
