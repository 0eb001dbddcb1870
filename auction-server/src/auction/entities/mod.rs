pub use {
    auction::*,
    bid::*,
};

mod auction;
mod bid;
