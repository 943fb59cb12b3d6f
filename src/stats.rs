//! # Stats
//!
//! $$
//! \Delta y_t=\mu+\beta t+\rho y_{t-1}+\sum_i \theta_i DU_{i,t}+\sum_i \gamma_i DT_{i,t}+\sum_j c_j\Delta y_{t-j}+\varepsilon_t
//! $$
//!
pub mod stationarity;
