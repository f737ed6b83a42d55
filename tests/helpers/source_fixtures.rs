//! Layout documents shared across tests.

pub const TEMPLATES_PATH: &str = "UI/Templates.SC2Layout";
pub const GAME_UI_PATH: &str = "UI/GameUI.SC2Layout";

/// A template library: `Templates/Dialog` with a title and a close button.
pub const TEMPLATES: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<Desc>
    <Constant name="DialogWidth" val="400"/>
    <Frame type="Frame" name="Dialog">
        <Width val="$DialogWidth"/>
        <Frame type="Frame" name="Title"/>
        <Frame type="Button" name="Close">
            <Text val="X"/>
        </Frame>
    </Frame>
</Desc>
"#;

/// The same library without the close button.
pub const TEMPLATES_WITHOUT_CLOSE: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<Desc>
    <Constant name="DialogWidth" val="400"/>
    <Frame type="Frame" name="Dialog">
        <Frame type="Frame" name="Title"/>
    </Frame>
</Desc>
"#;

/// A game UI using the library: the main frame inherits `Title` and `Close`.
pub const GAME_UI: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<Desc>
    <Constant name="Gap" val="8"/>
    <Frame type="Frame" name="Main" template="Templates/Dialog">
        <Handle val="MainHandle"/>
        <Anchor side="Top" relative="$this/Close"/>
        <DefaultButton val="$this/Close"/>
        <Frame type="Frame" name="Panel">
            <Height val="$Gap"/>
            <Frame type="Button" name="Ok">
                <Anchor side="Left" relative="$sibling-Cancel"/>
            </Frame>
            <Frame type="Button" name="Cancel">
                <Anchor side="Right" relative="$MainHandle/Title"/>
            </Frame>
        </Frame>
        <StateGroup name="Mode">
            <DefaultState val="Normal"/>
            <State name="Normal"/>
            <State name="Hidden">
                <Action type="SetProperty" Visible="false"/>
            </State>
        </StateGroup>
        <Animation name="FadeIn">
            <Event event="Show" action="Play"/>
            <Controller type="Fade" frame="$parent/Panel" duration="0.5"/>
        </Animation>
    </Frame>
</Desc>
"#;
