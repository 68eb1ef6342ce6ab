//! End-to-end build scenarios over full configurations.
