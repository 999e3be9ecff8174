// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The `util` module is a repository of small helper functions used across the codec that do
//! not belong to any single component.

pub mod bits;
pub mod sat;
