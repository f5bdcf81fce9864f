//! The context seen by task functions
