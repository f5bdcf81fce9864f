//! ser, par and opt, alone and combined

mod diamond;
mod helpers;
