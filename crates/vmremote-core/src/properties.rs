//! Typed property names per entity kind
//!
//! Each enum maps to the exact leaf the engine expects. The path builder
//! works on the text form, so anything not listed here can still be
//! addressed through [`crate::ParameterAddress::new`].

macro_rules! property_enum {
    (
        $(#[$meta:meta])*
        $name:ident {
            $($(#[$vmeta:meta])* $variant:ident => $text:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($(#[$vmeta])* $variant),+
        }

        impl $name {
            /// Every property of this kind
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Leaf name used in the engine path
            pub const fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl From<$name> for std::borrow::Cow<'static, str> {
            fn from(p: $name) -> Self {
                std::borrow::Cow::Borrowed(p.as_str())
            }
        }
    };
}

property_enum! {
    /// Input strip properties
    StripProperty {
        Mono => "Mono",
        Mute => "Mute",
        Solo => "Solo",
        MC => "MC",
        Gain => "Gain",
        PanX => "Pan_x",
        PanY => "Pan_y",
        ColorX => "Color_x",
        ColorY => "Color_y",
        FxX => "fx_x",
        FxY => "fx_y",
        Audibility => "Audibility",
        Comp => "Comp",
        Gate => "Gate",
        Karaoke => "Karaoke",
        Limit => "Limit",
        EqGain1 => "EQGain1",
        EqGain2 => "EQGain2",
        EqGain3 => "EQGain3",
        Label => "Label",
        A1 => "A1",
        A2 => "A2",
        A3 => "A3",
        A4 => "A4",
        A5 => "A5",
        B1 => "B1",
        B2 => "B2",
        B3 => "B3",
        Reverb => "Reverb",
        Delay => "Delay",
        Fx1 => "Fx1",
        Fx2 => "Fx2",
        PostReverb => "PostReverb",
        PostDelay => "PostDelay",
        PostFx1 => "PostFx1",
        PostFx2 => "PostFx2",
        FadeTo => "FadeTo",
        FadeBy => "FadeBy",
        AppGain => "AppGain",
        AppMute => "AppMute",
        DeviceName => "device.name",
        DeviceSampleRate => "device.sr",
    }
}

property_enum! {
    /// Output bus properties
    BusProperty {
        Mono => "Mono",
        Mute => "Mute",
        EqOn => "EQ.on",
        EqAb => "EQ.AB",
        Gain => "Gain",
        Label => "Label",
        FadeTo => "FadeTo",
        FadeBy => "FadeBy",
        Sel => "Sel",
        Monitor => "Monitor",
        ReturnReverb => "ReturnReverb",
        ReturnDelay => "ReturnDelay",
        ReturnFx1 => "ReturnFx1",
        ReturnFx2 => "ReturnFx2",
        ModeNormal => "mode.normal",
        ModeAmix => "mode.Amix",
        ModeBmix => "mode.Bmix",
        ModeRepeat => "mode.Repeat",
        ModeComposite => "mode.Composite",
        DeviceName => "device.name",
        DeviceSampleRate => "device.sr",
    }
}

property_enum! {
    /// Cassette recorder properties
    RecorderProperty {
        Stop => "stop",
        Play => "play",
        Record => "record",
        Pause => "pause",
        FastForward => "FF",
        Rewind => "REW",
        Loop => "mode.Loop",
        Gain => "Gain",
        A1 => "A1",
        A2 => "A2",
        A3 => "A3",
        A4 => "A4",
        A5 => "A5",
        B1 => "B1",
        B2 => "B2",
        B3 => "B3",
    }
}

property_enum! {
    /// Application-wide commands
    CommandAction {
        Shutdown => "Shutdown",
        Show => "Show",
        Restart => "Restart",
        Eject => "Eject",
        Reset => "Reset",
        Save => "Save",
        Load => "Load",
        Lock => "Lock",
    }
}

property_enum! {
    /// Macro button commands, addressed by button index
    CommandButton {
        State => "State",
        StateOnly => "StateOnly",
        Trigger => "Trigger",
        Color => "Color",
    }
}

property_enum! {
    /// EQ preset save/load commands, addressed by bus or strip index
    CommandEq {
        SaveBus => "SaveBus",
        LoadBus => "LoadBus",
        SaveStrip => "SaveStrip",
        LoadStrip => "LoadStrip",
    }
}

property_enum! {
    /// Engine state readable through `Command`
    VmState {
        Lock => "Lock",
        Show => "Show",
    }
}

property_enum! {
    /// VBAN stream properties, shared by incoming and outgoing streams
    VbanStreamProperty {
        On => "on",
        Name => "name",
        Ip => "ip",
        Port => "port",
        SampleRate => "sr",
        Channel => "channel",
        Bit => "bit",
        Quality => "quality",
        Route => "route",
    }
}
