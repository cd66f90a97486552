#![cfg_attr(not(feature = "std"), no_std)]


#[ink::contract]
mod value_store {
    // Wire selectors are fixed so off-chain callers can encode messages
    // without the contract metadata ("GETV" / "SETV" in ASCII).
    pub const GET_VALUE_SELECTOR: u32 = 0x4745_5456;
    pub const SET_VALUE_SELECTOR: u32 = 0x5345_5456;

    // Contract storage.
    #[ink(storage)]
    pub struct ValueStore {
        /// The one integer this contract holds.
        value: u128,
    }

    #[ink(event)]
    pub struct ValueChanged {
        #[ink(topic)]
        pub new_value: u128,
    }

    impl ValueStore {
        #[ink(constructor)]
        pub fn new(init_value: u128) -> Self {
            Self { value: init_value }
        }

        #[ink(constructor)]
        pub fn default() -> Self {
            Self::new(0)
        }

        // Overwrite the stored value and announce the change.
        #[ink(message, selector = 0x53455456)]
        pub fn set_value(&mut self, new_value: u128) {
            self.value = new_value;
            self.env().emit_event(ValueChanged { new_value });
        }

        // Pure read of the stored value.
        #[ink(message, selector = 0x47455456)]
        pub fn get_value(&self) -> u128 {
            self.value
        }
    }
}
