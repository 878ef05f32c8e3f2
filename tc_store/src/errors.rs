/*
 * Copyright © 2025, United States Government, as represented by the Administrator of
 * the National Aeronautics and Space Administration. All rights reserved.
 *
 * The “ODIN” software is licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License. You may obtain a copy
 * of the License at http://www.apache.org/licenses/LICENSE-2.0.
 *
 * Unless required by applicable law or agreed to in writing, software distributed under
 * the License is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND,
 * either express or implied. See the License for the specific language governing permissions
 * and limitations under the License.
 */

use thiserror::Error;

pub type Result<T> = std::result::Result<T, TcStoreError>;

#[derive(Error,Debug)]
pub enum TcStoreError {

    #[error("database error {0}")]
    DatabaseError( #[from] sqlx::Error),

    #[error("serde error {0}")]
    SerdeError( #[from] serde_json::Error),

    #[error("no such storm {0}")]
    NoSuchStorm( String ),

    #[error("invalid {0}")]
    InvalidValue( String ),

    #[error("illegal status transition {0}")]
    IllegalTransition( String ),
}

pub fn invalid_value (msg: impl ToString)->TcStoreError {
    TcStoreError::InvalidValue( msg.to_string())
}

pub fn illegal_transition (msg: impl ToString)->TcStoreError {
    TcStoreError::IllegalTransition( msg.to_string())
}
